//! Book Exchange CLI
//!
//! Terminal stand-in for the marketplace dashboards. The legacy login shim
//! is a separate binary, `bookexchange-shim`.

use std::path::PathBuf;
use std::sync::Arc;

use bookexchange::{
    api::{ApiClient, HttpTransport},
    error::{AppError, Result},
    models::{BookListing, Config, Course, Exchange, ExchangeStatus, Role, UserRecord},
    services::{
        BookService, CollectionView, CourseService, ExchangeService, FeedbackService, Flash,
        NotificationService, PurchaseFlow, PurchaseState, RefreshPolicy, ReportService,
        SessionAuthority, TransactionService, UserService, WishlistService,
    },
    storage::LocalStorage,
    utils::log as console,
};
use clap::{Args, Parser, Subcommand};

/// Book Exchange - textbook marketplace client
#[derive(Parser, Debug)]
#[command(name = "bookexchange", version, about = "Textbook marketplace client")]
struct Cli {
    /// Path to the configuration file
    #[arg(short, long, default_value = "bookexchange.toml")]
    config: PathBuf,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Only print outcomes
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Sign in and remember the session
    Login {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },
    /// Forget the session
    Logout,
    /// Show the signed-in user
    Whoami,
    /// Show the signed-in user's balance
    Balance,
    /// Load listings, balance and notifications together
    Dashboard,
    /// Validate the configuration file
    Validate,
    #[command(subcommand)]
    Books(BooksCommand),
    #[command(subcommand)]
    Users(UsersCommand),
    #[command(subcommand)]
    Notifications(NotificationsCommand),
    #[command(subcommand)]
    Transactions(TransactionsCommand),
    #[command(subcommand)]
    Reports(ReportsCommand),
    #[command(subcommand)]
    Exchanges(ExchangesCommand),
    #[command(subcommand)]
    Wishlist(WishlistCommand),
    #[command(subcommand)]
    Courses(CoursesCommand),
    #[command(subcommand)]
    Feedback(FeedbackCommand),
}

#[derive(Subcommand, Debug)]
enum BooksCommand {
    /// All listings
    List,
    /// Post a listing as the signed-in seller
    Add(NewListing),
    /// Remove a listing
    Delete { book_id: String },
    /// Buy a listing with your balance
    Buy { book_id: String },
    /// Your own listings
    Mine,
}

#[derive(Args, Debug)]
struct NewListing {
    #[arg(long)]
    title: String,
    #[arg(long, default_value = "")]
    author: String,
    #[arg(long)]
    price: f64,
    #[arg(long, default_value = "")]
    isbn: String,
    #[arg(long, default_value = "")]
    edition: String,
    #[arg(long, default_value = "")]
    condition: String,
    #[arg(long, default_value = "")]
    description: String,
    #[arg(long)]
    course_id: Option<String>,
}

#[derive(Subcommand, Debug)]
enum UsersCommand {
    List,
    Activate { user_id: String },
    Deactivate { user_id: String },
    Delete { user_id: String },
    /// Change your own password
    Password {
        #[arg(long)]
        new_password: String,
    },
}

#[derive(Subcommand, Debug)]
enum NotificationsCommand {
    List {
        /// Show the admin inbox
        #[arg(long)]
        admin: bool,
    },
    Read { notification_id: String },
    Delete { notification_id: String },
}

#[derive(Subcommand, Debug)]
enum TransactionsCommand {
    /// All transactions, or a student's with --student
    List {
        #[arg(long)]
        student: Option<String>,
    },
    /// Books you have bought
    Purchased,
}

#[derive(Subcommand, Debug)]
enum ReportsCommand {
    List,
    Seller {
        #[arg(long)]
        seller_email: String,
        #[arg(long)]
        content: String,
    },
    Book {
        #[arg(long)]
        title: String,
        #[arg(long)]
        content: String,
    },
    Delete { report_id: String },
}

#[derive(Subcommand, Debug)]
enum ExchangesCommand {
    List,
    /// Offer one of your books for someone else's
    Request {
        #[arg(long)]
        offered: String,
        #[arg(long)]
        requested: String,
        #[arg(long)]
        owner: String,
    },
    Respond {
        exchange_id: String,
        /// accepted or rejected
        #[arg(long)]
        action: String,
    },
}

#[derive(Subcommand, Debug)]
enum WishlistCommand {
    List,
    Add { book_id: String },
    Remove { book_id: String },
}

#[derive(Subcommand, Debug)]
enum CoursesCommand {
    List,
    /// Courses you teach
    Mine,
}

#[derive(Subcommand, Debug)]
enum FeedbackCommand {
    List { book_id: String },
    Add { book_id: String, text: String },
}

/// Initialize logging based on verbosity flag.
fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp_secs()
        .init();
}

/// Everything a command needs.
struct Context {
    config: Config,
    api: ApiClient,
    session: Arc<SessionAuthority>,
}

impl Context {
    async fn build(config: Config) -> Result<Self> {
        let transport = HttpTransport::new(&config.api)?;
        let api = ApiClient::new(Arc::new(transport));
        let store = Arc::new(LocalStorage::new(&config.session.storage_dir));
        let session = Arc::new(SessionAuthority::restore(api.clone(), store).await);
        Ok(Self {
            config,
            api,
            session,
        })
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    console::init(cli.quiet);

    if let Err(e) = run(cli).await {
        log::debug!("{:?}", e);
        console::failure(&e.display_message());
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    let config = Config::load_or_default(&cli.config);

    if let Command::Validate = cli.command {
        config.validate()?;
        console::success(&format!("{} is valid", cli.config.display()));
        return Ok(());
    }
    config.validate()?;

    let ctx = Context::build(config).await?;
    match cli.command {
        Command::Login { email, password } => {
            let session = ctx.session.login(&email, &password).await?;
            console::success(&format!("Signed in as {} ({})", session.email, session.role));
            console::sub_item(&format!("Dashboard: {}", session.role.dashboard()));
        }
        Command::Logout => {
            ctx.session.logout().await?;
            console::success("Signed out");
        }
        Command::Whoami => match ctx.session.current() {
            Some(session) => {
                console::header("Current session");
                console::sub_item(&format!("Email: {}", session.email));
                console::sub_item(&format!("Role: {}", session.role));
                if let Some(id) = &session.derived_id {
                    console::sub_item(&format!("Id: {}", id));
                }
            }
            None => console::info("Not signed in"),
        },
        Command::Balance => {
            let session = ctx.session.require()?;
            let balance = UserService::new(ctx.api.clone())
                .balance_by_email(&session.email)
                .await?;
            console::success(&format!("Balance: {}", console::money(balance)));
        }
        Command::Dashboard => dashboard(&ctx).await?,
        Command::Validate => {}
        Command::Books(cmd) => books(&ctx, cmd).await?,
        Command::Users(cmd) => users(&ctx, cmd).await?,
        Command::Notifications(cmd) => notifications(&ctx, cmd).await?,
        Command::Transactions(cmd) => transactions(&ctx, cmd).await?,
        Command::Reports(cmd) => reports(&ctx, cmd).await?,
        Command::Exchanges(cmd) => exchanges(&ctx, cmd).await?,
        Command::Wishlist(cmd) => wishlist(&ctx, cmd).await?,
        Command::Courses(cmd) => courses(&ctx, cmd).await?,
        Command::Feedback(cmd) => feedback(&ctx, cmd).await?,
    }
    Ok(())
}

fn print_listing(book: &BookListing) {
    console::sub_item(&format!(
        "{} | {} by {} | {}{}",
        book.book_id.as_deref().unwrap_or("-"),
        book.title,
        if book.author.is_empty() { "unknown" } else { book.author.as_str() },
        console::money(book.price),
        if book.is_digital { " | digital" } else { "" }
    ));
}

async fn dashboard(ctx: &Context) -> Result<()> {
    let session = ctx.session.require()?;
    let user_id = ctx.session.ensure_id().await?;

    let books = BookService::new(ctx.api.clone());
    let notifications = NotificationService::new(ctx.api.clone());
    let mut flow = PurchaseFlow::new(
        ctx.session.clone(),
        ctx.api.clone(),
        Flash::from_secs(ctx.config.flash.dismiss_secs),
    );

    let (listings, balance, inbox) = futures::join!(
        books.list(),
        flow.load_balance(),
        notifications.for_user(&user_id)
    );

    console::header(&format!("{} ({})", session.email, session.role.dashboard()));
    let mut items = Vec::new();
    match listings {
        Ok(list) => items.push(("Listings", list.len().to_string())),
        Err(e) => items.push(("Listings", e.display_message())),
    }
    match balance {
        Ok(balance) => items.push(("Balance", console::money(balance))),
        Err(e) => items.push(("Balance", e.display_message())),
    }
    match inbox {
        Ok(list) => {
            let unread = list.iter().filter(|n| !n.is_read).count();
            items.push(("Unread notifications", unread.to_string()));
        }
        Err(e) => items.push(("Notifications", e.display_message())),
    }
    console::summary("Dashboard", &items);
    Ok(())
}

async fn books(ctx: &Context, cmd: BooksCommand) -> Result<()> {
    let service = BookService::new(ctx.api.clone());
    match cmd {
        BooksCommand::List => {
            let mut view = CollectionView::new(service.client().clone(), RefreshPolicy::Refetch);
            view.refresh().await?;
            console::header(&format!("{} listing(s)", view.items().len()));
            view.items().iter().for_each(print_listing);
        }
        BooksCommand::Mine => {
            let user_id = ctx.session.ensure_id().await?;
            let mine = service.by_seller(&user_id).await?;
            console::header(&format!("Your listings ({})", mine.len()));
            mine.iter().for_each(print_listing);
        }
        BooksCommand::Add(listing) => {
            let user_id = ctx.session.ensure_id().await?;
            let mut book = BookListing::new(listing.title, listing.author, listing.price);
            book.isbn = listing.isbn;
            book.edition = listing.edition;
            book.condition = listing.condition;
            book.description = listing.description;
            book.course_id = listing.course_id;
            book.user_id = Some(user_id);

            let mut view = CollectionView::new(service.client().clone(), RefreshPolicy::Optimistic);
            view.add(book).await?;
            console::success("Listing posted");
        }
        BooksCommand::Delete { book_id } => {
            let mut view = CollectionView::new(service.client().clone(), RefreshPolicy::Refetch);
            view.remove(&book_id).await?;
            console::success(&format!("Deleted listing {}", book_id));
        }
        BooksCommand::Buy { book_id } => {
            let book = service
                .list()
                .await?
                .into_iter()
                .find(|b| b.book_id.as_deref() == Some(book_id.as_str()))
                .ok_or_else(|| AppError::validation(format!("No listing with id {book_id}")))?;

            let mut flow = PurchaseFlow::new(
                ctx.session.clone(),
                ctx.api.clone(),
                Flash::from_secs(ctx.config.flash.dismiss_secs),
            );
            if let Err(e) = flow.load_balance().await {
                log::warn!("Balance unavailable: {}", e);
            }
            // Failures are reported through the flow state.
            if let Err(e) = flow.purchase(&book).await {
                log::debug!("Purchase of {} failed: {:?}", book_id, e);
            }

            match flow.state() {
                PurchaseState::Succeeded { message, balance } => {
                    console::success(message);
                    console::sub_item(&format!("New balance: {}", console::money(*balance)));
                }
                PurchaseState::Failed(message) => {
                    return Err(AppError::validation(message.clone()));
                }
                PurchaseState::Idle | PurchaseState::Purchasing => {}
            }
        }
    }
    Ok(())
}

async fn users(ctx: &Context, cmd: UsersCommand) -> Result<()> {
    let service = UserService::new(ctx.api.clone());
    let mut view = CollectionView::new(service.client().clone(), RefreshPolicy::Refetch);
    match cmd {
        UsersCommand::List => {
            view.refresh().await?;
            console::header(&format!("{} user(s)", view.items().len()));
            for user in view.items() {
                print_user(user);
            }
        }
        UsersCommand::Activate { user_id } => {
            view.transition(&user_id, "activate", |u| u.is_active = true)
                .await?;
            console::success(&format!("Activated {}", user_id));
        }
        UsersCommand::Deactivate { user_id } => {
            view.transition(&user_id, "deactivate", |u| u.is_active = false)
                .await?;
            console::success(&format!("Deactivated {}", user_id));
        }
        UsersCommand::Delete { user_id } => {
            view.remove(&user_id).await?;
            console::success(&format!("Deleted user {}", user_id));
        }
        UsersCommand::Password { new_password } => {
            let user_id = ctx.session.ensure_id().await?;
            service.change_password(&user_id, &new_password).await?;
            console::success("Password updated");
        }
    }
    Ok(())
}

fn print_user(user: &UserRecord) {
    console::sub_item(&format!(
        "{} {} | {} | {} | {} | rating {}",
        console::check(user.is_active),
        user.user_id.as_deref().unwrap_or("-"),
        user.email,
        user.role,
        console::money(user.balance),
        user.rating_label()
    ));
}

async fn notifications(ctx: &Context, cmd: NotificationsCommand) -> Result<()> {
    let user_id = ctx.session.ensure_id().await?;
    let service = NotificationService::new(ctx.api.clone());
    let source = match &cmd {
        NotificationsCommand::List { admin: true } => {
            NotificationService::for_admin_request(&user_id)
        }
        _ => NotificationService::for_user_request(&user_id),
    };
    let mut view = CollectionView::with_source(
        service.client().clone(),
        source,
        RefreshPolicy::Optimistic,
    );

    match cmd {
        NotificationsCommand::List { .. } => {
            view.refresh().await?;
            console::header(&format!("{} notification(s)", view.items().len()));
            for n in view.items() {
                let when = n
                    .sent_at()
                    .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
                    .unwrap_or_default();
                console::sub_item(&format!(
                    "{} {} | {} | {} | {}",
                    console::check(n.is_read),
                    n.notification_id.as_deref().unwrap_or("-"),
                    when,
                    n.kind,
                    n.message
                ));
            }
        }
        NotificationsCommand::Read { notification_id } => {
            view.transition(&notification_id, "read", |n| n.is_read = true)
                .await?;
            console::success("Marked as read");
        }
        NotificationsCommand::Delete { notification_id } => {
            view.remove(&notification_id).await?;
            console::success("Notification deleted");
        }
    }
    Ok(())
}

async fn transactions(ctx: &Context, cmd: TransactionsCommand) -> Result<()> {
    let service = TransactionService::new(ctx.api.clone());
    match cmd {
        TransactionsCommand::List { student } => {
            let list = match student {
                Some(email) => service.by_student_email(&email).await?,
                None => service.list().await?,
            };
            console::header(&format!("{} transaction(s)", list.len()));
            for t in &list {
                console::sub_item(&format!(
                    "{} | book {} | {} | {}",
                    t.transaction_id.as_deref().unwrap_or("-"),
                    t.book_id.as_deref().unwrap_or("-"),
                    t.order_status.as_deref().unwrap_or("unknown"),
                    t.price.map(console::money).unwrap_or_default()
                ));
            }
        }
        TransactionsCommand::Purchased => {
            let user_id = ctx.session.ensure_id().await?;
            let books = service.purchased_by(&user_id).await?;
            console::header(&format!("{} purchased book(s)", books.len()));
            for b in &books {
                console::sub_item(&format!(
                    "{} by {} | {}",
                    b.title,
                    b.author,
                    b.price.map(console::money).unwrap_or_default()
                ));
            }
        }
    }
    Ok(())
}

async fn reports(ctx: &Context, cmd: ReportsCommand) -> Result<()> {
    let service = ReportService::new(ctx.api.clone());
    match cmd {
        ReportsCommand::List => {
            let mut view = CollectionView::new(service.client().clone(), RefreshPolicy::Refetch);
            view.refresh().await?;
            console::header(&format!("{} report(s)", view.items().len()));
            for r in view.items() {
                console::sub_item(&format!(
                    "{} | {:?} | by {} | {}",
                    r.report_id.as_deref().unwrap_or("-"),
                    r.report_type,
                    r.reported_by.as_deref().unwrap_or("-"),
                    r.content
                ));
            }
        }
        ReportsCommand::Seller {
            seller_email,
            content,
        } => {
            let session = ctx.session.require()?;
            service
                .report_seller(&session.email, &seller_email, &content)
                .await?;
            console::success("Report submitted");
        }
        ReportsCommand::Book { title, content } => {
            let session = ctx.session.require()?;
            service.report_book(&session.email, &title, &content).await?;
            console::success("Report submitted");
        }
        ReportsCommand::Delete { report_id } => {
            let mut view = CollectionView::new(service.client().clone(), RefreshPolicy::Refetch);
            view.remove(&report_id).await?;
            console::success("Report deleted");
        }
    }
    Ok(())
}

async fn exchanges(ctx: &Context, cmd: ExchangesCommand) -> Result<()> {
    let user_id = ctx.session.ensure_id().await?;
    let service = ExchangeService::new(ctx.api.clone());
    match cmd {
        ExchangesCommand::List => {
            let list = service.for_user(&user_id).await?;
            console::header(&format!("{} exchange(s)", list.len()));
            for e in &list {
                console::sub_item(&format!(
                    "{} | {} for {} | {}",
                    e.exchange_id.as_deref().unwrap_or("-"),
                    e.offered_book_id,
                    e.requested_book_id,
                    e.status
                ));
            }
        }
        ExchangesCommand::Request {
            offered,
            requested,
            owner,
        } => {
            let created = service
                .request(&Exchange {
                    offered_book_id: offered,
                    requested_book_id: requested,
                    requester_id: user_id,
                    owner_id: owner,
                    ..Exchange::default()
                })
                .await?;
            console::success(&format!(
                "Exchange requested ({})",
                created.exchange_id.unwrap_or_default()
            ));
        }
        ExchangesCommand::Respond {
            exchange_id,
            action,
        } => {
            let decision = match action.to_lowercase().as_str() {
                "accept" | "accepted" => ExchangeStatus::Accepted,
                "reject" | "rejected" => ExchangeStatus::Rejected,
                other => {
                    return Err(AppError::validation(format!(
                        "Unknown action {other:?}; use accepted or rejected"
                    )));
                }
            };
            let message = service.respond(&exchange_id, decision, &user_id).await?;
            console::success(&message.unwrap_or_else(|| format!("Exchange {decision}")));
        }
    }
    Ok(())
}

async fn wishlist(ctx: &Context, cmd: WishlistCommand) -> Result<()> {
    let user_id = ctx.session.ensure_id().await?;
    let service = WishlistService::new(ctx.api.clone());
    match cmd {
        WishlistCommand::List => {
            let list = service.for_user(&user_id).await?;
            console::header(&format!("Wishlist ({})", list.books.len()));
            list.books.iter().for_each(print_listing);
        }
        WishlistCommand::Add { book_id } => {
            service.add_book(&user_id, &book_id).await?;
            console::success("Added to wishlist");
        }
        WishlistCommand::Remove { book_id } => {
            service.remove_book(&user_id, &book_id).await?;
            console::success("Removed from wishlist");
        }
    }
    Ok(())
}

fn print_course(course: &Course) {
    console::sub_item(&format!(
        "{} | {} | {} | {}",
        course.course_id.as_deref().unwrap_or("-"),
        course.course_name,
        course.teacher,
        course.textbooks.join(", ")
    ));
}

async fn courses(ctx: &Context, cmd: CoursesCommand) -> Result<()> {
    let service = CourseService::new(ctx.api.clone());
    let source = match cmd {
        CoursesCommand::List => None,
        CoursesCommand::Mine => {
            let session = ctx.session.require()?;
            if session.role != Role::Teacher && session.role != Role::Admin {
                log::warn!("{} is not a teacher account", session.email);
            }
            Some(CourseService::by_teacher_request(&session.email))
        }
    };
    let mut view = match source {
        Some(source) => {
            CollectionView::with_source(service.client().clone(), source, RefreshPolicy::Refetch)
        }
        None => CollectionView::new(service.client().clone(), RefreshPolicy::Refetch),
    };
    view.refresh().await?;
    console::header(&format!("{} course(s)", view.items().len()));
    view.items().iter().for_each(print_course);
    Ok(())
}

async fn feedback(ctx: &Context, cmd: FeedbackCommand) -> Result<()> {
    let service = FeedbackService::new(ctx.api.clone());
    match cmd {
        FeedbackCommand::List { book_id } => {
            let entries = service.for_book(&book_id).await?;
            console::header(&format!("{} feedback entries", entries.len()));
            for f in &entries {
                console::sub_item(&format!(
                    "{} | {}",
                    f.feedback_id.as_deref().unwrap_or("-"),
                    f.feedback
                ));
            }
        }
        FeedbackCommand::Add { book_id, text } => {
            ctx.session.require()?;
            let entry = service.add(&book_id, &text).await?;
            console::success(&format!(
                "Feedback added ({})",
                entry.feedback_id.unwrap_or_default()
            ));
        }
    }
    Ok(())
}
