use std::sync::Arc;

use anyhow::{Context, bail};
use api::{AdminApi, ApiClient, HackathonApi, Session};
use chrono::{DateTime, Utc};
use clap::{Args, Parser, Subcommand};
use common::SolutionForm;
use common::hackathon::StartHackathonRequest;
use common::participation::Participation;
use common::problem::CreateProblemRequest;
use common::time::{format_local, parse_instant};
use common::user::RegisterRequest;
use dashboard::admin::{AutoCloseOutcome, close_if_all_submitted, run_auto_close};
use dashboard::config::HackathonAppConfig;
use dashboard::{CountdownDisplay, DashboardSession, DashboardSnapshot, Notice, SystemClock};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "hackathon", version, about = "Hackathon dashboard client")]
struct Cli {
    /// Account username. Falls back to `auth.username` in the config.
    #[arg(long, short, global = true)]
    username: Option<String>,

    /// Account password. Falls back to `auth.password` in the config.
    #[arg(long, env = "HACKATHON_PASSWORD", hide_env_values = true, global = true)]
    password: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Follow the running hackathon's countdown until it ends.
    Watch,
    /// Submit a solution for the running hackathon.
    Submit {
        /// Repository URL.
        #[arg(long)]
        repo: String,
        /// Deployed application URL.
        #[arg(long, default_value = "")]
        hosted: String,
    },
    /// Pick the problem to work on.
    SelectProblem { problem_id: String },
    /// List problem statements.
    Problems,
    /// Create a team account.
    Register {
        #[arg(long)]
        team: String,
        #[arg(long)]
        email: String,
    },
    Admin(Admin),
}

/// Organizer commands. Require an admin account.
#[derive(Debug, Args)]
struct Admin {
    #[command(subcommand)]
    command: AdminCommand,
}

#[derive(Debug, Subcommand)]
enum AdminCommand {
    /// Show the running hackathon.
    Status {
        /// Close it when every team has submitted.
        #[arg(long)]
        auto_close: bool,
        /// Keep checking until interrupted.
        #[arg(long, requires = "auto_close")]
        watch: bool,
    },
    /// Start a hackathon for the given teams.
    Start {
        #[arg(long)]
        name: String,
        #[arg(long)]
        hours: u32,
        #[arg(long = "team", required = true)]
        teams: Vec<String>,
    },
    /// Force-close a hackathon, the running one by default.
    Close {
        #[arg(long)]
        hackathon: Option<String>,
    },
    /// Past and present hackathons, newest first.
    History,
    /// Registered teams.
    Teams,
    /// Assign a problem to a team.
    Assign { user_id: String, problem_id: String },
    CreateProblem {
        #[arg(long)]
        title: String,
        #[arg(long)]
        description: String,
        #[arg(long)]
        track: String,
        #[arg(long, default_value = "")]
        requirements: String,
        /// RFC 3339 instant. Defaults to now.
        #[arg(long)]
        release: Option<DateTime<Utc>>,
        #[arg(long)]
        deadline: Option<DateTime<Utc>>,
    },
    DeleteProblem { id: String },
    DeleteUser { id: String },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_target(false)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let config = HackathonAppConfig::load().context("Failed to load config")?;
    let client = ApiClient::new(&config.api).context("Failed to build API client")?;

    if let Command::Register { team, email } = &cli.command {
        let (username, password) = credentials(&cli, &config)?;
        let response = client
            .register(&RegisterRequest {
                team_name: team.clone(),
                username,
                email: email.clone(),
                password,
                team_members: Vec::new(),
            })
            .await
            .context("Registration failed")?;
        println!("Registered {}: {}", response.username, response.message);
        return Ok(());
    }

    let (username, password) = credentials(&cli, &config)?;
    let session = client
        .login(&username, &password)
        .await
        .context("Login failed")?;

    match cli.command {
        Command::Watch => watch(session, &config).await,
        Command::Submit { repo, hosted } => submit(session, &config, repo, hosted).await,
        Command::SelectProblem { problem_id } => {
            session
                .select_problem(&problem_id)
                .await
                .context("Failed to select problem")?;
            println!("Selected problem {problem_id}");
            Ok(())
        }
        Command::Problems => {
            let problems = session.problems().await.context("Failed to list problems")?;
            for p in problems {
                println!(
                    "{}  [{}]  {}",
                    p.id.as_deref().unwrap_or("-"),
                    p.track,
                    p.title
                );
            }
            Ok(())
        }
        Command::Register { .. } => Ok(()),
        Command::Admin(admin) => {
            if !session.context().is_admin() {
                bail!("{username} is not an admin");
            }
            run_admin(session, &config, admin.command).await
        }
    }
}

fn credentials(cli: &Cli, config: &HackathonAppConfig) -> anyhow::Result<(String, String)> {
    let username = cli
        .username
        .clone()
        .or_else(|| config.auth.username.clone())
        .context("No username given (use --username or auth.username)")?;
    let password = cli
        .password
        .clone()
        .or_else(|| config.auth.password.clone())
        .context("No password given (use --password or auth.password)")?;
    Ok((username, password))
}

async fn watch(session: Session, config: &HackathonAppConfig) -> anyhow::Result<()> {
    let api: Arc<dyn HackathonApi> = Arc::new(session);
    let dashboard = DashboardSession::start(api, Arc::new(SystemClock), &config.dashboard);
    let mut rx = dashboard.subscribe();
    let mut screen = Screen::default();

    let result = loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                info!("Interrupted");
                break Ok(());
            }
            changed = rx.changed() => {
                if changed.is_err() {
                    break Ok(());
                }
                let snapshot = rx.borrow_and_update().clone();
                for line in screen.render(&snapshot) {
                    println!("{line}");
                }

                match &snapshot.notice {
                    Some(Notice::SessionExpired) => {
                        break Err(anyhow::anyhow!("Session expired, log in again"));
                    }
                    Some(Notice::FetchFailed { message }) => {
                        warn!(%message, "Showing last known state");
                        dashboard.dismiss_notice();
                    }
                    None => {}
                }

                if snapshot.loaded && snapshot.lifecycle.current.is_none() {
                    println!("No hackathon is running");
                    break Ok(());
                }
            }
        }
    };

    dashboard.teardown();
    result
}

/// What `watch` has already printed, so a republished snapshot prints nothing new.
#[derive(Debug, Default)]
struct Screen {
    current: Option<String>,
    countdown: Option<CountdownDisplay>,
}

impl Screen {
    fn render(&mut self, snapshot: &DashboardSnapshot) -> Vec<String> {
        let mut lines = Vec::new();
        let current = snapshot.lifecycle.current.as_ref();
        let id = current.map(|c| c.participation.hackathon_id.clone());

        if id != self.current {
            if let Some(c) = current {
                lines.push(format!(
                    "{} ends {}",
                    c.participation.hackathon_name,
                    format_local(c.window.end)
                ));
                if let Some(problem) = &c.participation.selected_problem {
                    lines.push(format!("Problem: {}", problem.title));
                }
            }
            for ended in &snapshot.lifecycle.ended {
                lines.push(format!(
                    "  {} ({})",
                    ended.participation.hackathon_name, ended.reason
                ));
            }
            self.current = id;
        }

        if self.countdown.as_ref() != Some(&snapshot.countdown) {
            match &snapshot.countdown {
                CountdownDisplay::Running(left) => lines.push(left.clone()),
                CountdownDisplay::Expired => lines.push("Time is up".to_string()),
                CountdownDisplay::Idle => {}
            }
            self.countdown = Some(snapshot.countdown.clone());
        }

        lines
    }
}

async fn submit(
    session: Session,
    config: &HackathonAppConfig,
    repo: String,
    hosted: String,
) -> anyhow::Result<()> {
    let form = SolutionForm::new(repo, hosted);
    form.validate()?;

    let api: Arc<dyn HackathonApi> = Arc::new(session);
    let dashboard = DashboardSession::start(api, Arc::new(SystemClock), &config.dashboard);
    dashboard
        .refresh()
        .await
        .context("Failed to load participations")?;

    let outcome = dashboard.submit_solution(&form).await;
    let snapshot = dashboard.snapshot();
    dashboard.teardown();

    match outcome {
        Ok(()) => {
            let submitted = snapshot
                .participations
                .iter()
                .filter_map(submission_line)
                .collect::<Vec<_>>();
            println!("Solution submitted");
            for line in submitted {
                println!("  {line}");
            }
            Ok(())
        }
        Err(e) if e.is_retryable() => Err(e).context("Submission failed, try again"),
        Err(e) => Err(e.into()),
    }
}

fn submission_line(p: &Participation) -> Option<String> {
    let solution = p.solution.as_ref()?;
    let repo = solution.github_url.as_deref()?;
    let at = solution
        .submission_time
        .as_deref()
        .and_then(|t| parse_instant(t).ok())
        .map(format_local)
        .unwrap_or_default();
    Some(format!("{}: {repo} {at}", p.hackathon_name))
}

async fn run_admin(
    session: Session,
    config: &HackathonAppConfig,
    command: AdminCommand,
) -> anyhow::Result<()> {
    match command {
        AdminCommand::Status { auto_close, watch } => {
            let status = session
                .hackathon_status()
                .await
                .context("Failed to fetch status")?;
            match (&status.name, status.is_active) {
                (Some(name), true) => println!("{name} is running"),
                (Some(name), false) => println!("{name} has ended"),
                (None, _) => println!("No hackathon has been started"),
            }

            if watch {
                let api: Arc<dyn AdminApi> = Arc::new(session);
                tokio::select! {
                    _ = run_auto_close(api, config.dashboard.admin_poll_interval()) => {}
                    _ = tokio::signal::ctrl_c() => info!("Interrupted"),
                }
            } else if auto_close {
                match close_if_all_submitted(&session).await? {
                    AutoCloseOutcome::NoActiveHackathon => {}
                    AutoCloseOutcome::AwaitingSubmissions => {
                        println!("Waiting for teams to submit")
                    }
                    AutoCloseOutcome::Closed { .. } => println!("All teams submitted, closed"),
                }
            }
        }
        AdminCommand::Start { name, hours, teams } => {
            session
                .start_hackathon(&StartHackathonRequest {
                    hackathon_name: name.clone(),
                    team_ids: teams,
                    duration_hours: hours,
                })
                .await
                .context("Failed to start hackathon")?;
            println!("Started {name} for {hours}h");
        }
        AdminCommand::Close { hackathon } => {
            session
                .close_hackathon(hackathon.as_deref())
                .await
                .context("Failed to close hackathon")?;
            println!("Closed");
        }
        AdminCommand::History => {
            for record in session.history().await.context("Failed to fetch history")? {
                let state = if record.active { "running" } else { "ended" };
                println!(
                    "{}  {}  {} -> {}  ({state})",
                    record.hackathon_id, record.hackathon_name, record.start_time, record.end_time
                );
                for team in &record.teams {
                    let mark = if team.has_solution { "submitted" } else { "-" };
                    println!("    {}  {mark}", team.team_name);
                }
            }
        }
        AdminCommand::Teams => {
            for team in session.teams().await.context("Failed to list teams")? {
                println!(
                    "{}  {}  {}",
                    team.id.as_deref().unwrap_or("-"),
                    team.team_name,
                    team.assigned_problem_id.as_deref().unwrap_or("unassigned")
                );
            }
        }
        AdminCommand::Assign {
            user_id,
            problem_id,
        } => {
            session
                .assign_problem(&user_id, &problem_id)
                .await
                .context("Failed to assign problem")?;
            println!("Assigned {problem_id} to {user_id}");
        }
        AdminCommand::CreateProblem {
            title,
            description,
            track,
            requirements,
            release,
            deadline,
        } => {
            let problem = session
                .create_problem(&CreateProblemRequest {
                    title,
                    description,
                    track,
                    requirements,
                    release_date: release.unwrap_or_else(Utc::now),
                    deadline,
                })
                .await
                .context("Failed to create problem")?;
            println!("Created problem {}", problem.id.as_deref().unwrap_or("-"));
        }
        AdminCommand::DeleteProblem { id } => {
            session
                .delete_problem(&id)
                .await
                .context("Failed to delete problem")?;
            println!("Deleted problem {id}");
        }
        AdminCommand::DeleteUser { id } => {
            session
                .delete_user(&id)
                .await
                .context("Failed to delete user")?;
            println!("Deleted user {id}");
        }
    }
    Ok(())
}
