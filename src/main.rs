use std::{process, sync::Arc};

use praxis::{
    application::{
        admin::{
            appointments::AdminAppointmentService, categories::AdminCategoryService,
            comments::AdminCommentService, contact::AdminContactService,
            notifications::NotificationService, posts::AdminPostService, reports::ReportService,
            services::AdminServiceService, tags::AdminTagService, users::AdminUserService,
        },
        blog::{BlogService, BlogTtls},
        error::AppError,
        intake::IntakeService,
        practice::PracticeService,
        repos::{
            AppointmentsRepo, CategoriesRepo, CommentsRepo, ContactRepo, NotificationsRepo,
            PostsRepo, PostsWriteRepo, SearchRepo, ServicesRepo, TagsRepo, UsersRepo,
        },
        search::SearchService,
    },
    cache::{CacheStore, MemoryStore},
    config,
    infra::{
        db::PostgresRepositories,
        error::InfraError,
        http::{AdminState, HealthCheck, HttpState, build_admin_router, build_public_router},
        telemetry,
    },
};
use tokio::{sync::watch, try_join};
use tracing::{Dispatch, Level, dispatcher, error, info};
use tracing_subscriber::fmt as tracing_fmt;

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        report_application_error(&error);
        process::exit(1);
    }
}

fn report_application_error(error: &AppError) {
    if dispatcher::has_been_set() {
        error!(error = %error, "application error");
        return;
    }

    let subscriber = tracing_fmt().with_max_level(Level::ERROR).finish();
    let dispatch = Dispatch::new(subscriber);
    dispatcher::with_default(&dispatch, || {
        error!(error = %error, "application error");
    });
}

async fn run() -> Result<(), AppError> {
    let (cli_args, settings) = config::load_with_cli()
        .map_err(|err| AppError::unexpected(format!("failed to load configuration: {err}")))?;

    let command = cli_args
        .command
        .unwrap_or(config::Command::Serve(Box::<config::ServeArgs>::default()));

    telemetry::init(&settings.logging).map_err(AppError::from)?;

    match command {
        config::Command::Serve(_) => run_serve(settings).await,
        config::Command::Migrate(args) => run_migrate(settings, args).await,
    }
}

async fn run_serve(settings: config::Settings) -> Result<(), AppError> {
    let repositories = init_repositories(&settings).await?;
    let app = build_application_context(repositories, &settings);
    serve_http(&settings, app.http_state, app.admin_state).await
}

async fn run_migrate(
    settings: config::Settings,
    args: config::MigrateArgs,
) -> Result<(), AppError> {
    let database_url = args
        .database_url
        .or_else(|| settings.database.url.clone())
        .ok_or_else(|| InfraError::configuration("database url is not configured"))
        .map_err(AppError::from)?;

    let pool = PostgresRepositories::connect(&database_url, settings.database.max_connections)
        .await
        .map_err(|err| AppError::from(InfraError::database(err)))?;

    PostgresRepositories::run_migrations(&pool)
        .await
        .map_err(|err| AppError::from(InfraError::database(err)))?;

    info!(target: "praxis::migrate", "migrations applied");
    Ok(())
}

struct ApplicationContext {
    http_state: HttpState,
    admin_state: AdminState,
}

async fn init_repositories(
    settings: &config::Settings,
) -> Result<Arc<PostgresRepositories>, AppError> {
    let database_url = settings
        .database
        .url
        .as_ref()
        .ok_or_else(|| InfraError::configuration("database url is not configured"))
        .map_err(AppError::from)?;

    let pool = PostgresRepositories::connect(database_url, settings.database.max_connections)
        .await
        .map_err(|err| AppError::from(InfraError::database(err)))?;

    PostgresRepositories::run_migrations(&pool)
        .await
        .map_err(|err| AppError::from(InfraError::database(err)))?;

    Ok(Arc::new(PostgresRepositories::new(pool)))
}

fn build_application_context(
    repositories: Arc<PostgresRepositories>,
    settings: &config::Settings,
) -> ApplicationContext {
    let posts_repo: Arc<dyn PostsRepo> = repositories.clone();
    let posts_write_repo: Arc<dyn PostsWriteRepo> = repositories.clone();
    let categories_repo: Arc<dyn CategoriesRepo> = repositories.clone();
    let tags_repo: Arc<dyn TagsRepo> = repositories.clone();
    let comments_repo: Arc<dyn CommentsRepo> = repositories.clone();
    let services_repo: Arc<dyn ServicesRepo> = repositories.clone();
    let appointments_repo: Arc<dyn AppointmentsRepo> = repositories.clone();
    let contact_repo: Arc<dyn ContactRepo> = repositories.clone();
    let users_repo: Arc<dyn UsersRepo> = repositories.clone();
    let notifications_repo: Arc<dyn NotificationsRepo> = repositories.clone();
    let search_repo: Arc<dyn SearchRepo> = repositories.clone();
    let health: Arc<dyn HealthCheck> = repositories.clone();

    let store: Arc<dyn CacheStore> = Arc::new(MemoryStore::new(settings.cache.capacity));

    let blog = BlogService::new(
        posts_repo.clone(),
        categories_repo.clone(),
        comments_repo.clone(),
        store.clone(),
        BlogTtls {
            post: settings.cache.post_ttl,
            list: settings.cache.list_ttl,
        },
    );
    let practice = PracticeService::new(
        services_repo.clone(),
        store.clone(),
        settings.cache.service_ttl,
    );
    let search = SearchService::new(search_repo);
    let intake = IntakeService::new(
        appointments_repo.clone(),
        contact_repo.clone(),
        services_repo.clone(),
        notifications_repo.clone(),
    );

    let http_state = HttpState {
        blog,
        practice,
        search,
        intake,
        db: health.clone(),
    };

    let admin_state = AdminState {
        posts: AdminPostService::new(
            posts_repo.clone(),
            posts_write_repo,
            store.clone(),
        ),
        categories: AdminCategoryService::new(categories_repo.clone(), store.clone()),
        tags: AdminTagService::new(tags_repo, store.clone()),
        comments: AdminCommentService::new(comments_repo.clone(), store.clone()),
        services: AdminServiceService::new(services_repo, store.clone()),
        appointments: AdminAppointmentService::new(appointments_repo.clone()),
        contact: AdminContactService::new(contact_repo),
        users: AdminUserService::new(users_repo),
        reports: ReportService::new(
            posts_repo,
            categories_repo,
            comments_repo,
            appointments_repo,
        ),
        notifications: NotificationService::new(notifications_repo),
        store,
        db: health,
    };

    ApplicationContext {
        http_state,
        admin_state,
    }
}

async fn serve_http(
    settings: &config::Settings,
    http_state: HttpState,
    admin_state: AdminState,
) -> Result<(), AppError> {
    let public_router = build_public_router(http_state);
    let admin_router = build_admin_router(admin_state);

    let public_listener = tokio::net::TcpListener::bind(settings.server.public_addr)
        .await
        .map_err(|err| AppError::from(InfraError::from(err)))?;
    let admin_listener = tokio::net::TcpListener::bind(settings.server.admin_addr)
        .await
        .map_err(|err| AppError::from(InfraError::from(err)))?;

    info!(
        target: "praxis::server",
        public = %settings.server.public_addr,
        admin = %settings.server.admin_addr,
        "listening"
    );

    let (shutdown_tx, shutdown_rx) = watch::channel(());
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            drop(shutdown_tx);
        }
    });

    let mut public_shutdown = shutdown_rx.clone();
    let public_server = axum::serve(public_listener, public_router.into_make_service())
        .with_graceful_shutdown(async move {
            let _ = public_shutdown.changed().await;
        });
    let mut admin_shutdown = shutdown_rx.clone();
    let admin_server = axum::serve(admin_listener, admin_router.into_make_service())
        .with_graceful_shutdown(async move {
            let _ = admin_shutdown.changed().await;
        });

    let grace = settings.server.graceful_shutdown;
    let mut deadline = shutdown_rx;
    let drain_deadline = async move {
        let _ = deadline.changed().await;
        tokio::time::sleep(grace).await;
    };

    tokio::select! {
        result = async { try_join!(public_server, admin_server) } => {
            result.map_err(|err| AppError::unexpected(format!("server error: {err}")))?;
        }
        _ = drain_deadline => {
            return Err(AppError::unexpected(
                "graceful shutdown deadline exceeded while draining connections",
            ));
        }
    }

    Ok(())
}
