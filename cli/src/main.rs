use std::path::PathBuf;
use std::sync::Arc;

use blogdesk::api::posts::{EXCERPT_CHARS, excerpt, filter_posts};
use blogdesk::api::users::page_after_delete;
use blogdesk::api::{BlogApi, DEFAULT_PAGE_SIZE};
use blogdesk::credentials::{CredentialStore, FileCredentialStore};
use blogdesk::error::ConfigError;
use blogdesk::nav::NavMenu;
use blogdesk::types::{Post, PostDraft};
use blogdesk::{AccessGuard, ApiError, AuthError, ClientConfig, DenyTarget, HttpTransport, Page, ReqwestTransport, SessionManager};
use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use tracing_subscriber::EnvFilter;

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error("{}", .0.user_message())]
    Auth(#[from] AuthError),
    #[error("{}", .0.user_message())]
    Api(#[from] ApiError),
    #[error("not signed in; run `blogdesk login` first")]
    NotSignedIn,
    #[error("invalid JSON output: {0}")]
    InvalidJson(#[from] serde_json::Error),
}

#[derive(Parser, Debug)]
#[command(name = "blogdesk", about = "Blog platform client")]
struct Cli {
    #[arg(long, env = "BLOG_API_URL")]
    base_url: Option<String>,

    #[arg(long, env = "BLOG_API_PREFIX")]
    api_prefix: Option<String>,

    #[arg(long, env = "BLOG_CREDENTIALS_PATH")]
    credentials: Option<PathBuf>,

    /// Send signed-in users without the required role to /403 instead of home.
    #[arg(long, default_value_t = false)]
    forbidden_page: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    Login {
        username: String,
        #[arg(long, env = "BLOG_PASSWORD", hide_env_values = true)]
        password: String,
    },
    Logout,
    Whoami,
    Register {
        username: String,
        #[arg(long, env = "BLOG_PASSWORD", hide_env_values = true)]
        password: String,
        /// Defaults to `--password`.
        #[arg(long)]
        confirm: Option<String>,
    },
    Posts(PostsCommand),
    Users(UsersCommand),
    /// Show what the app would render at `path` for the current session.
    Route {
        path: String,
    },
}

#[derive(Args, Debug)]
struct PageArgs {
    #[arg(long, default_value_t = 0)]
    page: u32,
    #[arg(long, default_value_t = DEFAULT_PAGE_SIZE)]
    size: u32,
}

#[derive(Args, Debug)]
struct PostsCommand {
    #[command(subcommand)]
    command: PostsSubcommand,
}

#[derive(Subcommand, Debug)]
enum PostsSubcommand {
    List {
        #[command(flatten)]
        paging: PageArgs,
        /// Filter the fetched page by title or content.
        #[arg(long)]
        search: Option<String>,
    },
    Mine {
        #[command(flatten)]
        paging: PageArgs,
    },
    Show {
        id: i64,
    },
    Create {
        #[arg(long)]
        title: String,
        #[arg(long)]
        content: String,
    },
    Update {
        id: i64,
        #[arg(long)]
        title: String,
        #[arg(long)]
        content: String,
    },
    Delete {
        id: i64,
    },
}

#[derive(Args, Debug)]
struct UsersCommand {
    #[command(subcommand)]
    command: UsersSubcommand,
}

#[derive(Subcommand, Debug)]
enum UsersSubcommand {
    List {
        #[arg(long, default_value = "")]
        query: String,
        #[command(flatten)]
        paging: PageArgs,
    },
    Show {
        id: i64,
    },
    Create {
        username: String,
        #[arg(long)]
        password: String,
    },
    Update {
        id: i64,
        #[arg(long)]
        username: String,
        /// Leave unset to keep the current password.
        #[arg(long)]
        password: Option<String>,
    },
    Delete {
        id: i64,
        /// Rows shown on the current page, to pick the page to return to.
        #[arg(long, default_value_t = 10)]
        rows_on_page: usize,
        #[arg(long, default_value_t = 0)]
        page: u32,
    },
}

#[tokio::main]
async fn main() -> Result<(), CliError> {
    let dotenv = dotenvy::dotenv();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();
    match dotenv {
        Ok(path) => tracing::debug!(path = %path.display(), "loaded .env"),
        Err(e) if e.not_found() => {}
        Err(e) => tracing::warn!(error = %e, "ignoring unreadable .env"),
    }

    let cli = Cli::parse();
    let config = resolve_config(&cli)?;
    let store: Arc<dyn CredentialStore> = Arc::new(FileCredentialStore::new(config.credentials_path.clone()));
    let transport: Arc<dyn HttpTransport> = Arc::new(ReqwestTransport::from_config(&config)?);
    let session = SessionManager::open(store, transport, config.endpoints.clone()).await;
    tracing::debug!(phase = ?session.snapshot().phase(), base_url = %config.base_url, "session opened");
    let deny = if cli.forbidden_page { DenyTarget::Forbidden } else { DenyTarget::Home };

    match cli.command {
        Command::Login { username, password } => {
            let identity = session.login(&username, &password).await?;
            print_json(&identity)
        }
        Command::Logout => {
            session.logout();
            println!("signed out");
            Ok(())
        }
        Command::Whoami => {
            let identity = session.snapshot().identity.ok_or(CliError::NotSignedIn)?;
            print_json(&identity)
        }
        Command::Register { username, password, confirm } => {
            let confirm = confirm.unwrap_or_else(|| password.clone());
            session.register(&username, &password, &confirm).await?;
            println!("account created; sign in with `blogdesk login {username}`");
            Ok(())
        }
        Command::Posts(posts) => run_posts(&session, posts).await,
        Command::Users(users) => run_users(&session, users).await,
        Command::Route { path } => {
            run_route(&session, AccessGuard::new(deny), &path);
            Ok(())
        }
    }
}

fn resolve_config(cli: &Cli) -> Result<ClientConfig, CliError> {
    let from_env = ClientConfig::from_env()?;
    let base_url = cli.base_url.clone().unwrap_or(from_env.base_url);
    let prefix = cli.api_prefix.clone().unwrap_or_else(|| from_env.endpoints.prefix().to_owned());
    let credentials = cli.credentials.clone().unwrap_or(from_env.credentials_path);
    Ok(ClientConfig::new(&base_url, &prefix, credentials, from_env.timeouts)?)
}

fn require_session(session: &SessionManager) -> Result<(), CliError> {
    if session.token().is_none() {
        return Err(CliError::NotSignedIn);
    }
    Ok(())
}

async fn run_posts(session: &SessionManager, command: PostsCommand) -> Result<(), CliError> {
    require_session(session)?;
    let api = BlogApi::new(session.pipeline()).posts;
    match command.command {
        PostsSubcommand::List { paging, search } => {
            let mut page = api.list(paging.page, paging.size).await?;
            if let Some(query) = search {
                page.content = filter_posts(&page.content, &query).into_iter().cloned().collect();
            }
            print_page(&page.map(PostSummary::from))
        }
        PostsSubcommand::Mine { paging } => print_page(&api.mine(paging.page, paging.size).await?.map(PostSummary::from)),
        PostsSubcommand::Show { id } => print_json(&api.get(id).await?),
        PostsSubcommand::Create { title, content } => {
            api.create(&PostDraft { title, content }).await?;
            println!("post created");
            Ok(())
        }
        PostsSubcommand::Update { id, title, content } => {
            api.update(id, &PostDraft { title, content }).await?;
            println!("post {id} updated");
            Ok(())
        }
        PostsSubcommand::Delete { id } => {
            api.delete(id).await?;
            println!("post {id} deleted");
            Ok(())
        }
    }
}

async fn run_users(session: &SessionManager, command: UsersCommand) -> Result<(), CliError> {
    require_session(session)?;
    let api = BlogApi::new(session.pipeline()).users;
    match command.command {
        UsersSubcommand::List { query, paging } => print_page(&api.list(&query, paging.page, paging.size).await?),
        UsersSubcommand::Show { id } => print_json(&api.get(id).await?),
        UsersSubcommand::Create { username, password } => {
            api.create(&username, &password).await?;
            println!("user {} created", username.trim());
            Ok(())
        }
        UsersSubcommand::Update { id, username, password } => {
            api.update(id, &username, password.as_deref()).await?;
            println!("user {id} updated");
            Ok(())
        }
        UsersSubcommand::Delete { id, rows_on_page, page } => {
            api.delete(id).await?;
            println!("user {id} deleted; showing page {}", page_after_delete(rows_on_page, page));
            Ok(())
        }
    }
}

fn run_route(session: &SessionManager, guard: AccessGuard, path: &str) {
    let snapshot = session.snapshot();
    let navigation = guard.navigate(&snapshot, path);
    println!("route:    {}", navigation.route);
    println!("decision: {:?}", navigation.decision);
    if navigation.decision.is_redirect() {
        println!("redirect: {}", navigation.decision.redirect_path().unwrap_or_default());
    }
    match NavMenu::for_session(&snapshot, path) {
        Some(menu) => println!("nav:      {} -> {} | {}", menu.primary.label, menu.primary.path, menu.greeting),
        None => println!("nav:      hidden"),
    }
}

/// List row: post content shortened to an excerpt.
#[derive(Serialize)]
struct PostSummary {
    id: i64,
    title: String,
    excerpt: String,
}

impl From<Post> for PostSummary {
    fn from(post: Post) -> Self {
        Self { id: post.id, excerpt: excerpt(&post.content, EXCERPT_CHARS), title: post.title }
    }
}

/// Print a page as JSON, with paging hints on stderr.
fn print_page<T: Serialize>(page: &Page<T>) -> Result<(), CliError> {
    print_json(page)?;
    if page.has_previous() {
        eprintln!("previous: --page {}", page.number - 1);
    }
    if page.has_next() {
        eprintln!("next:     --page {}", page.number + 1);
    }
    Ok(())
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<(), CliError> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
