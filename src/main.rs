//! jobdeck CLI - drive the job board API from the terminal.
//!
//! Thin front-end over the library: each subcommand restores the stored
//! session, obtains a valid access token from the session manager, and
//! calls one endpoint wrapper.

use std::io::{self, Write};
use std::path::Path;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use jobdeck::api::ApiClient;
use jobdeck::auth::{KeyringStore, SessionManager};
use jobdeck::config::Config;
use jobdeck::models::{EmploymentType, JobInput, NewUser, ProfileUpdate, UserProfile};

/// Initialize the tracing subscriber for logging
fn init_tracing() {
    // Use RUST_LOG env var to control log level (e.g., RUST_LOG=debug)
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(filter)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (silently ignore if not found)
    let _ = dotenvy::dotenv();

    init_tracing();

    let args: Vec<String> = std::env::args().collect();
    let command = args.get(1).map(String::as_str).unwrap_or("help");
    let rest = &args[2..];

    let mut config = Config::load()?;
    let client = ApiClient::new(config.api_base_url())?;
    let manager = SessionManager::new(Arc::new(client.clone()), Arc::new(KeyringStore));

    match command {
        "login" => cmd_login(&client, &manager, &mut config, rest).await,
        "logout" => {
            manager.logout().await?;
            println!("Logged out.");
            Ok(())
        }
        "register" => cmd_register(&client).await,
        "me" => cmd_me(&client, &manager).await,
        "change-password" => cmd_change_password(&client, &manager).await,
        "update-profile" => cmd_update_profile(&client, &manager).await,
        "delete-account" => cmd_delete_account(&client, &manager).await,
        "jobs" => cmd_jobs(&client, rest).await,
        "search" => cmd_search(&client, rest).await,
        "show" => cmd_show(&client, rest).await,
        "add-job" => cmd_add_job(&client, &manager).await,
        "edit-job" => cmd_edit_job(&client, &manager, rest).await,
        "delete-job" => cmd_delete_job(&client, &manager, rest).await,
        "applicants" => cmd_applicants(&client, &manager, rest).await,
        "apply" => cmd_apply(&client, &manager, rest).await,
        "cvs" => cmd_cvs(&client, &manager).await,
        "upload-cv" => cmd_upload_cv(&client, &manager, rest).await,
        "help" | "--help" | "-h" => {
            print_usage();
            Ok(())
        }
        other => {
            print_usage();
            bail!("unknown command: {other}")
        }
    }
}

fn print_usage() {
    println!("jobdeck - job board client");
    println!();
    println!("Usage: jobdeck <command> [args]");
    println!();
    println!("  login [email]              Log in and store tokens in the keychain");
    println!("  logout                     Clear the stored session");
    println!("  register                   Create a new account");
    println!("  me                         Show the current user's profile");
    println!("  change-password            Change the current user's password");
    println!("  update-profile             Edit name and contact number");
    println!("  delete-account             Permanently delete the account");
    println!("  jobs [page]                List job postings");
    println!("  search <query>             Search job postings");
    println!("  show <job-id>              Show one job posting");
    println!("  add-job                    Create a job posting (admin)");
    println!("  edit-job <job-id>          Update a job posting (admin)");
    println!("  delete-job <job-id>        Delete a job posting (admin)");
    println!("  applicants <job-id>        List applications for a job (admin)");
    println!("  apply <job-id> <cv-id> [note..]  Apply to a job with a stored CV");
    println!("  cvs                        List uploaded CVs");
    println!("  upload-cv <path>           Upload a CV (pdf/doc/docx, max 2 MiB)");
}

fn prompt(label: &str) -> Result<String> {
    print!("{label}: ");
    io::stdout().flush()?;
    let mut line = String::new();
    io::stdin().read_line(&mut line)?;
    Ok(line.trim().to_string())
}

/// Restore the stored session and hand back a usable access token,
/// or explain how to get one.
async fn require_token(manager: &SessionManager) -> Result<String> {
    manager.restore().await?;
    manager
        .valid_access_token()
        .await
        .context("Not logged in. Run `jobdeck login` first.")
}

async fn cmd_login(
    client: &ApiClient,
    manager: &SessionManager,
    config: &mut Config,
    args: &[String],
) -> Result<()> {
    let email = match args.first() {
        Some(email) => email.clone(),
        None => {
            let last = config.last_email.clone().unwrap_or_default();
            prompt_with_default("Email", &last)?
        }
    };
    if email.is_empty() {
        bail!("email is required");
    }
    let password = prompt("Password")?;

    let tokens = client.login(&email, &password).await?;
    // Mirror what the login response tells us; the full profile is
    // fetched lazily by restore() on later invocations
    let user = UserProfile {
        email: email.clone(),
        first_name: String::new(),
        last_name: String::new(),
        contact_number: String::new(),
        user_type: tokens.user_type,
    };
    manager.login(user, tokens.access, tokens.refresh).await?;

    config.last_email = Some(email.clone());
    config.save()?;
    info!(email = %email, "logged in");
    println!("Logged in as {email}.");
    Ok(())
}

async fn cmd_register(client: &ApiClient) -> Result<()> {
    let new_user = NewUser {
        first_name: prompt("First name")?,
        last_name: prompt("Last name")?,
        email: prompt("Email")?,
        contact_number: prompt("Contact number")?,
        password: prompt("Password (min 8 chars)")?,
    };
    client.register(&new_user).await?;
    println!("Account created. Run `jobdeck login` to sign in.");
    Ok(())
}

async fn cmd_me(client: &ApiClient, manager: &SessionManager) -> Result<()> {
    let token = require_token(manager).await?;
    let profile = client.me(&token).await?;
    println!("{} <{}>", profile.full_name(), profile.email);
    if !profile.contact_number.is_empty() {
        println!("Contact: {}", profile.contact_number);
    }
    println!("Role: {:?}", profile.user_type);
    Ok(())
}

async fn cmd_change_password(client: &ApiClient, manager: &SessionManager) -> Result<()> {
    let token = require_token(manager).await?;
    let current = prompt("Current password")?;
    let new = prompt("New password")?;
    let confirm = prompt("Confirm new password")?;
    if new != confirm {
        bail!("new passwords do not match");
    }
    client.change_password(&token, &current, &new).await?;
    println!("Password changed.");
    Ok(())
}

async fn cmd_jobs(client: &ApiClient, args: &[String]) -> Result<()> {
    let page: u32 = match args.first() {
        Some(raw) => raw.parse().context("page must be a number")?,
        None => 1,
    };
    let listing = client.jobs(page).await?;
    for job in &listing.results {
        println!(
            "[{}] {} ({}, {})",
            job.id,
            job.summary(),
            job.location,
            job.employment_type.label()
        );
    }
    if listing.has_next() {
        println!("-- more: jobs {}", page + 1);
    }
    Ok(())
}

async fn cmd_search(client: &ApiClient, args: &[String]) -> Result<()> {
    if args.is_empty() {
        bail!("usage: jobdeck search <query>");
    }
    let query = args.join(" ");
    let results = client.search_jobs(&query, 1, 50).await?;
    for job in &results.results {
        println!("[{}] {} ({})", job.id, job.summary(), job.location);
    }
    println!("{} match(es)", results.total);
    Ok(())
}

async fn cmd_show(client: &ApiClient, args: &[String]) -> Result<()> {
    let id: i64 = args
        .first()
        .context("usage: jobdeck show <job-id>")?
        .parse()
        .context("job id must be a number")?;
    let job = client.job(id).await?;
    println!("{}", job.summary());
    println!("{} | {}", job.location, job.employment_type.label());
    if !job.tags.is_empty() {
        println!("Tags: {}", job.tags.join(", "));
    }
    println!();
    println!("{}", job.description);
    Ok(())
}

async fn cmd_update_profile(client: &ApiClient, manager: &SessionManager) -> Result<()> {
    let token = require_token(manager).await?;
    let current = client.me(&token).await?;
    let update = ProfileUpdate {
        first_name: prompt_with_default("First name", &current.first_name)?,
        last_name: prompt_with_default("Last name", &current.last_name)?,
        contact_number: prompt_with_default("Contact number", &current.contact_number)?,
    };
    client.update_profile(&token, &update).await?;
    println!("Profile updated.");
    Ok(())
}

async fn cmd_delete_account(client: &ApiClient, manager: &SessionManager) -> Result<()> {
    let token = require_token(manager).await?;
    let confirm = prompt("Type 'delete' to permanently delete this account")?;
    if confirm != "delete" {
        bail!("aborted");
    }
    client.delete_account(&token).await?;
    manager.logout().await?;
    println!("Account deleted.");
    Ok(())
}

fn prompt_with_default(label: &str, default: &str) -> Result<String> {
    let entered = prompt(&format!("{label} [{default}]"))?;
    if entered.is_empty() {
        Ok(default.to_string())
    } else {
        Ok(entered)
    }
}

fn prompt_employment_type(default: Option<EmploymentType>) -> Result<EmploymentType> {
    let default_label = default.map(|et| et.label()).unwrap_or("Full-time");
    let entered = prompt_with_default("Employment type (Full-time/Contract)", default_label)?;
    match entered.as_str() {
        "Full-time" => Ok(EmploymentType::FullTime),
        "Contract" => Ok(EmploymentType::Contract),
        other => bail!("unknown employment type: {other}"),
    }
}

fn parse_tags(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|tag| !tag.is_empty())
        .map(String::from)
        .collect()
}

async fn cmd_add_job(client: &ApiClient, manager: &SessionManager) -> Result<()> {
    let token = require_token(manager).await?;
    let input = JobInput {
        title: prompt("Title")?,
        company: prompt("Company")?,
        location: prompt("Location")?,
        employment_type: prompt_employment_type(None)?,
        tags: parse_tags(&prompt("Tags (comma-separated)")?),
        description: prompt("Description")?,
    };
    let job = client.create_job(&token, &input).await?;
    println!("Created job [{}] {}.", job.id, job.summary());
    Ok(())
}

async fn cmd_edit_job(client: &ApiClient, manager: &SessionManager, args: &[String]) -> Result<()> {
    let id: i64 = args
        .first()
        .context("usage: jobdeck edit-job <job-id>")?
        .parse()
        .context("job id must be a number")?;
    let token = require_token(manager).await?;
    let current = client.job(id).await?;
    let input = JobInput {
        title: prompt_with_default("Title", &current.title)?,
        company: prompt_with_default("Company", &current.company)?,
        location: prompt_with_default("Location", &current.location)?,
        employment_type: prompt_employment_type(Some(current.employment_type))?,
        tags: parse_tags(&prompt_with_default("Tags", &current.tags.join(", "))?),
        description: prompt_with_default("Description", &current.description)?,
    };
    let job = client.update_job(&token, id, &input).await?;
    println!("Updated job [{}] {}.", job.id, job.summary());
    Ok(())
}

async fn cmd_delete_job(client: &ApiClient, manager: &SessionManager, args: &[String]) -> Result<()> {
    let id: i64 = args
        .first()
        .context("usage: jobdeck delete-job <job-id>")?
        .parse()
        .context("job id must be a number")?;
    let token = require_token(manager).await?;
    client.delete_job(&token, id).await?;
    println!("Deleted job [{id}].");
    Ok(())
}

async fn cmd_applicants(client: &ApiClient, manager: &SessionManager, args: &[String]) -> Result<()> {
    let id: i64 = args
        .first()
        .context("usage: jobdeck applicants <job-id>")?
        .parse()
        .context("job id must be a number")?;
    let token = require_token(manager).await?;
    let applications = client.job_applicants(&token, id).await?;
    if applications.is_empty() {
        println!("No applications yet.");
        return Ok(());
    }
    for app in &applications {
        let cv = app.cv_url.as_deref().unwrap_or("no CV");
        println!(
            "{} applied {} ({})",
            app.user_email,
            app.applied_at.format("%Y-%m-%d"),
            cv
        );
    }
    Ok(())
}

async fn cmd_apply(client: &ApiClient, manager: &SessionManager, args: &[String]) -> Result<()> {
    if args.len() < 2 {
        bail!("usage: jobdeck apply <job-id> <cv-id> [note..]");
    }
    let job_id: i64 = args[0].parse().context("job id must be a number")?;
    let cv_id: i64 = args[1].parse().context("cv id must be a number")?;
    let note = if args.len() > 2 {
        Some(args[2..].join(" "))
    } else {
        None
    };

    let token = require_token(manager).await?;
    let application = client
        .apply_to_job(&token, job_id, cv_id, note.as_deref())
        .await?;
    println!(
        "Applied to \"{}\" on {}.",
        application.job_title,
        application.applied_at.format("%Y-%m-%d")
    );
    Ok(())
}

async fn cmd_cvs(client: &ApiClient, manager: &SessionManager) -> Result<()> {
    let token = require_token(manager).await?;
    let cvs = client.my_cvs(&token).await?;
    if cvs.is_empty() {
        println!("No CVs uploaded yet.");
        return Ok(());
    }
    for cv in &cvs {
        println!(
            "[{}] {} (uploaded {})",
            cv.id,
            cv.file_name(),
            cv.uploaded_at.format("%Y-%m-%d")
        );
    }
    Ok(())
}

async fn cmd_upload_cv(client: &ApiClient, manager: &SessionManager, args: &[String]) -> Result<()> {
    let path = args.first().context("usage: jobdeck upload-cv <path>")?;
    let path = Path::new(path);
    let file_name = path
        .file_name()
        .and_then(|name| name.to_str())
        .context("invalid file name")?;
    let bytes = std::fs::read(path).with_context(|| format!("failed to read {}", path.display()))?;

    let content_type = match path.extension().and_then(|ext| ext.to_str()) {
        Some("pdf") => "application/pdf",
        Some("doc") => "application/msword",
        Some("docx") => {
            "application/vnd.openxmlformats-officedocument.wordprocessingml.document"
        }
        _ => "application/octet-stream",
    };

    let token = require_token(manager).await?;
    let cv = client
        .upload_cv(&token, file_name, content_type, bytes)
        .await?;
    println!("Uploaded {} as CV [{}].", cv.file_name(), cv.id);
    Ok(())
}
