use std::{future::IntoFuture, io::BufRead, path::PathBuf, process, sync::Arc};

use rudra::{
    application::{
        audit::AuditTrailService,
        auth::{AuthService, PasswordPolicy, hash_password},
        chrome::ChromeService,
        dashboard::DashboardService,
        error::AppError,
        repos::{AuditRepo, HealthRepo, UsageRepo, UsersRepo},
    },
    config,
    domain::audit::AuditCriteria,
    infra::{
        error::InfraError,
        graphql::{GraphQlClient, HasuraRepositories},
        http::{self, AdminState},
        telemetry,
    },
};
use tokio::{net::TcpListener, sync::watch};
use tracing::{Dispatch, Level, dispatcher, error, info, warn};
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
        config::Command::ExportAudit(args) => run_export_audit(settings, args).await,
        config::Command::HashPassword(args) => run_hash_password(settings, args).await,
    }
}

fn init_repositories(settings: &config::Settings) -> Result<Arc<HasuraRepositories>, AppError> {
    let client = GraphQlClient::new(&settings.graphql)?;
    info!(
        target = "rudra::bootstrap",
        endpoint = %client.endpoint(),
        admin_secret = settings.graphql.admin_secret.is_some(),
        "GraphQL client ready"
    );
    Ok(Arc::new(HasuraRepositories::new(client)))
}

fn build_audit_service(
    repositories: &Arc<HasuraRepositories>,
    settings: &config::Settings,
) -> AuditTrailService {
    let audit_repo: Arc<dyn AuditRepo> = repositories.clone();
    AuditTrailService::new(
        audit_repo,
        settings.display.timezone,
        settings.audit.rows_per_page,
    )
}

fn build_admin_state(settings: &config::Settings) -> Result<AdminState, AppError> {
    let repositories = init_repositories(settings)?;

    let usage_repo: Arc<dyn UsageRepo> = repositories.clone();
    let users_repo: Arc<dyn UsersRepo> = repositories.clone();
    let health_repo: Arc<dyn HealthRepo> = repositories.clone();

    Ok(AdminState {
        chrome: Arc::new(ChromeService::new(settings.display.brand_title.clone())),
        dashboard: Arc::new(DashboardService::new(usage_repo)),
        audit: Arc::new(build_audit_service(&repositories, settings)),
        auth: Arc::new(AuthService::new(
            users_repo,
            PasswordPolicy::from(&settings.auth),
        )),
        health: health_repo,
        secure_cookies: settings.auth.secure_cookies,
    })
}

async fn run_serve(settings: config::Settings) -> Result<(), AppError> {
    let admin_state = build_admin_state(&settings)?;
    serve_http(&settings, admin_state).await
}

async fn run_export_audit(
    settings: config::Settings,
    args: config::ExportAuditArgs,
) -> Result<(), AppError> {
    let repositories = init_repositories(&settings)?;
    let service = build_audit_service(&repositories, &settings);

    let criteria = AuditCriteria::from_parts(
        args.category,
        args.action,
        args.user,
        args.start,
        args.end,
    );

    let export = service.export_csv(&criteria).await?;
    let path = args
        .output
        .unwrap_or_else(|| PathBuf::from(&export.filename));

    tokio::fs::write(&path, export.body.as_bytes())
        .await
        .map_err(|err| AppError::from(InfraError::from(err)))?;

    info!(
        target = "rudra::export_audit",
        path = %path.display(),
        rows = export.rows,
        "Audit trail exported"
    );
    Ok(())
}

async fn run_hash_password(
    settings: config::Settings,
    args: config::HashPasswordArgs,
) -> Result<(), AppError> {
    let mut policy = PasswordPolicy::from(&settings.auth);
    if let Some(scheme) = args.scheme {
        policy.scheme = scheme;
    }

    let password = tokio::task::spawn_blocking(read_password_line)
        .await
        .map_err(|err| AppError::unexpected(err.to_string()))?
        .map_err(|err| AppError::from(InfraError::from(err)))?;

    if password.is_empty() {
        return Err(AppError::validation("no password provided on stdin"));
    }

    let hash = tokio::task::spawn_blocking(move || hash_password(&password, policy))
        .await
        .map_err(|err| AppError::unexpected(err.to_string()))?
        .map_err(|err| AppError::unexpected(err.to_string()))?;

    println!("{hash}");
    Ok(())
}

fn read_password_line() -> std::io::Result<String> {
    let mut line = String::new();
    std::io::stdin().lock().read_line(&mut line)?;
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}

async fn serve_http(settings: &config::Settings, admin_state: AdminState) -> Result<(), AppError> {
    let router = http::build_admin_router(admin_state);

    let listener = TcpListener::bind(settings.server.addr)
        .await
        .map_err(|err| AppError::from(InfraError::from(err)))?;

    info!(
        target = "rudra::serve",
        addr = %settings.server.addr,
        "Admin console listening"
    );

    let (stopping_tx, mut stopping_rx) = watch::channel(false);
    let server = axum::serve(listener, router.into_make_service()).with_graceful_shutdown(
        async move {
            shutdown_signal().await;
            let _ = stopping_tx.send(true);
        },
    );

    let grace = settings.server.graceful_shutdown;
    let grace_elapsed = async move {
        if stopping_rx.wait_for(|stopping| *stopping).await.is_err() {
            std::future::pending::<()>().await;
        }
        tokio::time::sleep(grace).await;
    };

    tokio::select! {
        result = server.into_future() => {
            result.map_err(|err| AppError::unexpected(format!("server error: {err}")))?;
        }
        _ = grace_elapsed => {
            warn!(
                target = "rudra::serve",
                grace_seconds = grace.as_secs(),
                "Grace period elapsed; dropping open connections"
            );
        }
    }

    info!(target = "rudra::serve", "Admin console stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            error!(target = "rudra::serve", error = %err, "failed to listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(err) => {
                error!(target = "rudra::serve", error = %err, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }

    info!(target = "rudra::serve", "Shutdown signal received; draining connections");
}
