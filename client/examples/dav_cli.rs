// SPDX-FileCopyrightText: 2026 davbridge contributors
//
// SPDX-License-Identifier: Apache-2.0

//! DAV client validation tool.
//!
//! This is a standalone CLI example for testing the client implementation
//! against real CalDAV and CardDAV servers. It serves as both a validation
//! tool and example code for using the store API.

use std::error::Error;
use std::io::Write as _;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use colored::Colorize as _;
use davbridge_client::{
    AddressBookStore, BaikalResolver, CalendarQueryRequest, CalendarStore, CollectionProperties,
    Credentials, DavClient, DavConfig, DavConnector, DavError, GenericResolver, PathResolver,
    RadicaleResolver, current_user_principal, delegated_principals,
};

/// DAV client validation tool.
#[derive(Parser)]
#[command(name = "dav_cli")]
#[command(about = "CalDAV/CardDAV client validation tool", long_about = None)]
#[command(version)]
struct Cli {
    /// DAV server URL
    #[arg(long)]
    server: Option<String>,
    /// Principal identifier, usually the username
    #[arg(long)]
    principal: Option<String>,
    /// Server path layout: generic, radicale, baikal
    #[arg(long, default_value = "generic")]
    layout: String,
    /// Username for authentication
    #[arg(long)]
    username: Option<String>,
    /// Password for authentication
    #[arg(long)]
    password: Option<String>,
    /// Bearer token for OAuth
    #[arg(long)]
    token: Option<String>,
    /// Request timeout in seconds
    #[arg(long, default_value = "30")]
    timeout: u64,
    #[command(subcommand)]
    command: Commands,
}

/// Available commands.
#[derive(Subcommand)]
enum Commands {
    /// Probe the server and list its DAV features
    Features,
    /// Show the current user principal and scheduling URLs
    Principal,
    /// List all calendar collections
    ListCals,
    /// List all address book collections
    ListBooks,
    /// Create a calendar collection
    MkCal {
        /// Collection identifier (last path segment)
        id: String,
        /// Display name
        #[arg(long)]
        name: Option<String>,
    },
    /// Delete a calendar collection
    RmCal {
        /// Collection identifier
        id: String,
    },
    /// List the objects of a calendar collection
    ListObjects {
        /// Collection identifier
        collection: String,
    },
    /// Get one object from a calendar collection
    Get {
        /// Collection identifier
        collection: String,
        /// Object name (e.g. "meeting.ics")
        name: String,
    },
    /// Store an object into a calendar collection
    Put {
        /// Collection identifier
        collection: String,
        /// Object name
        name: String,
        /// iCalendar file path (or "-" for stdin)
        input: String,
    },
    /// Delete one object from a calendar collection
    Delete {
        /// Collection identifier
        collection: String,
        /// Object name
        name: String,
    },
    /// Query events of a calendar collection in a UTC time range
    Query {
        /// Collection identifier
        collection: String,
        /// Range start as a UTC stamp (e.g. "20260101T000000Z")
        #[arg(long)]
        start: String,
        /// Range end as a UTC stamp
        #[arg(long)]
        end: Option<String>,
    },
    /// List principals who delegated calendar access to this user
    Delegations,
}

impl Cli {
    fn build_config(&self) -> Result<DavConfig, Box<dyn std::error::Error>> {
        // Read from environment variables first
        let server = self
            .server
            .clone()
            .or_else(|| std::env::var("DAVBRIDGE_SERVER").ok())
            .ok_or_else(|| {
                "DAVBRIDGE_SERVER must be provided via --server or DAVBRIDGE_SERVER env var"
                    .to_string()
            })?;

        let mut config = DavConfig::new(server);
        config.principal = self
            .principal
            .clone()
            .or_else(|| std::env::var("DAVBRIDGE_PRINCIPAL").ok());
        config.timeout_secs = self.timeout;
        Ok(config)
    }

    fn build_credentials(&self) -> Credentials {
        let username = self
            .username
            .clone()
            .or_else(|| std::env::var("DAVBRIDGE_USERNAME").ok());
        let password = self
            .password
            .clone()
            .or_else(|| std::env::var("DAVBRIDGE_PASSWORD").ok());
        let token = self
            .token
            .clone()
            .or_else(|| std::env::var("DAVBRIDGE_TOKEN").ok());

        if let Some(token) = token {
            Credentials::Bearer { token }
        } else if let (Some(username), Some(password)) = (username, password) {
            Credentials::UserPassword { username, password }
        } else {
            Credentials::None
        }
    }

    fn build_resolver(&self) -> Result<Arc<dyn PathResolver>, Box<dyn std::error::Error>> {
        match self.layout.as_str() {
            "generic" => Ok(Arc::new(GenericResolver)),
            "radicale" => Ok(Arc::new(RadicaleResolver)),
            "baikal" => Ok(Arc::new(BaikalResolver)),
            other => {
                Err(format!("Unknown layout '{other}'. Use generic, radicale or baikal").into())
            }
        }
    }
}

async fn cmd_principal(client: &DavClient) -> Result<(), Box<dyn std::error::Error>> {
    let principal = current_user_principal(client).await?;
    println!("Principal: {}", principal.as_str());

    let urls = davbridge_client::schedule_urls(client, principal.as_str()).await?;
    match urls.inbox {
        Some(inbox) => println!("Schedule inbox:  {}", inbox.as_str()),
        None => println!("Schedule inbox:  (none)"),
    }
    match urls.outbox {
        Some(outbox) => println!("Schedule outbox: {}", outbox.as_str()),
        None => println!("Schedule outbox: (none)"),
    }

    Ok(())
}

async fn cmd_list_cals(store: &CalendarStore) -> Result<(), Box<dyn std::error::Error>> {
    let calendars = store.collections().await?;

    if calendars.is_empty() {
        println!("No calendars found");
        return Ok(());
    }

    println!("{:-<100}", "");
    println!("{:<50} {:<20} {:<20}", "Path", "Name", "Components");
    println!("{:-<100}", "");

    for cal in &calendars {
        let name = cal.display_name().unwrap_or("Unnamed");
        let components = cal.supported_components().join(", ");
        println!("{:<50} {:<20} {}", cal.path().as_str(), name, components);
    }

    Ok(())
}

async fn cmd_list_books(store: &AddressBookStore) -> Result<(), Box<dyn std::error::Error>> {
    let books = store.collections().await?;

    if books.is_empty() {
        println!("No address books found");
        return Ok(());
    }

    println!("{:-<80}", "");
    println!("{:<50} {:<30}", "Path", "Name");
    println!("{:-<80}", "");

    for book in &books {
        let name = book.display_name().unwrap_or("Unnamed");
        println!("{:<50} {:<30}", book.path().as_str(), name);
    }

    Ok(())
}

async fn cmd_mk_cal(
    store: &CalendarStore,
    id: &str,
    name: Option<&str>,
) -> Result<(), Box<dyn std::error::Error>> {
    let properties = CollectionProperties {
        display_name: name.map(str::to_string),
        ..CollectionProperties::default()
    };
    let calendar = store.add_collection_with(id, &properties).await?;

    println!("{}", "✓ Calendar created successfully".green());
    println!("Path: {}", calendar.path().as_str());

    Ok(())
}

async fn cmd_rm_cal(store: &CalendarStore, id: &str) -> Result<(), Box<dyn std::error::Error>> {
    store.remove_collection(id).await?;

    println!("{}", "✓ Calendar deleted successfully".green());

    Ok(())
}

async fn cmd_list_objects(
    store: &CalendarStore,
    id: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let collection = store.collection(id).await?;
    let objects = collection.objects().await?;

    if objects.is_empty() {
        println!("No objects found");
        return Ok(());
    }

    println!("{:-<100}", "");
    println!("{:<60} {:<20} {:<20}", "Href", "ETag", "Content-Type");
    println!("{:-<100}", "");

    for object in &objects {
        let etag = object
            .etag
            .as_ref()
            .map_or("-", davbridge_client::ETag::as_str);
        let content_type = object.content_type.as_deref().unwrap_or("-");
        println!(
            "{:<60} {:<20} {:<20}",
            object.href.as_str(),
            etag,
            content_type
        );
    }

    Ok(())
}

async fn cmd_get(
    store: &CalendarStore,
    id: &str,
    name: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let collection = store.collection(id).await?;
    let object = collection.object(name).await?;

    println!("Href: {}", object.href.as_str());
    match &object.etag {
        Some(etag) => println!("ETag: {}", etag.as_str()),
        None => println!("ETag: (none)"),
    }
    println!();
    println!("{}", object.data);

    Ok(())
}

/// Read iCalendar data from a file or stdin.
fn read_input(input: &str) -> Result<String, Box<dyn std::error::Error>> {
    if input == "-" {
        use std::io::Read;
        let mut buffer = String::new();
        std::io::stdin().read_to_string(&mut buffer)?;
        Ok(buffer)
    } else {
        Ok(std::fs::read_to_string(input)?)
    }
}

async fn cmd_put(
    store: &CalendarStore,
    id: &str,
    name: &str,
    input: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let collection = store.collection(id).await?;
    let data = read_input(input)?;
    let etag = collection.put_object(name, data, None).await?;

    println!("{}", "✓ Object stored successfully".green());
    println!("Name: {name}");
    match etag {
        Some(etag) => println!("ETag: {}", etag.as_str()),
        None => println!("ETag: (not reported)"),
    }

    Ok(())
}

async fn cmd_delete(
    store: &CalendarStore,
    id: &str,
    name: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let collection = store.collection(id).await?;

    // Fetch the current entity tag so the delete is guarded
    let object = collection.object(name).await?;
    collection.delete_object(name, object.etag.as_ref()).await?;

    println!("{}", "✓ Object deleted successfully".green());
    println!("Name: {name}");

    Ok(())
}

async fn cmd_query(
    store: &CalendarStore,
    id: &str,
    start: &str,
    end: Option<&str>,
) -> Result<(), Box<dyn std::error::Error>> {
    let collection = store.collection(id).await?;
    let request = CalendarQueryRequest::new()
        .component("VEVENT")
        .time_range(start, end.map(str::to_string));
    let events = collection.calendar_query(&request).await?;

    if events.is_empty() {
        println!("No events found");
        return Ok(());
    }

    for event in &events {
        let name = event
            .href
            .as_str()
            .rsplit('/')
            .next()
            .unwrap_or(event.href.as_str());
        println!("{:-<80}", "");
        println!("{name}");
        println!("{:-<80}", "");
        println!("{}", event.data);
    }

    Ok(())
}

async fn cmd_delegations(client: &DavClient) -> Result<(), Box<dyn std::error::Error>> {
    let principal = current_user_principal(client).await?;
    let delegations = delegated_principals(client, principal.as_str()).await?;

    if delegations.is_empty() {
        println!("No delegations found");
        return Ok(());
    }

    println!("{:-<80}", "");
    println!("{:<50} {:<20} {:<10}", "Principal", "Name", "Access");
    println!("{:-<80}", "");

    for delegation in &delegations {
        let name = delegation.display_name.as_deref().unwrap_or("Unnamed");
        let access = match delegation.access {
            davbridge_client::DelegationAccess::ReadWrite => "write",
            davbridge_client::DelegationAccess::Read => "read",
        };
        println!(
            "{:<50} {:<20} {:<10}",
            delegation.principal.as_str(),
            name,
            access
        );
    }

    Ok(())
}

/// Format error for user-friendly display.
fn format_error(err: Box<dyn Error>) -> String {
    if let Some(dav) = err.downcast_ref::<DavError>() {
        return match dav {
            DavError::Auth(_) => {
                format!("{} Authentication failed", "Error:".red().bold())
            }
            DavError::NotFound(href) => {
                format!("{} Resource not found: {}", "Error:".red().bold(), href)
            }
            DavError::FailedOperation { status: 412, .. } => format!(
                "{} ETag conflict - resource was modified by another client",
                "Error:".red().bold()
            ),
            DavError::Transport(_) => format!(
                "{} Network error - check server URL and connection",
                "Error:".red().bold()
            ),
            other => format!("{} {}", "Error:".red().bold(), other),
        };
    }
    format!("{} {}", "Error:".red().bold(), err)
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load environment variables from .env files (if they exist)
    // Priority: .env.local (highest) -> .env -> existing environment variables (lowest)
    dotenvy::dotenv().ok(); // Load .env
    dotenvy::from_filename(".env.local").ok(); // Load .env.local (overrides .env)

    let cli = Cli::parse();
    let config = cli.build_config()?;
    let credentials = cli.build_credentials();
    let resolver = cli.build_resolver()?;

    // Create a new runtime for the async operations
    let runtime = tokio::runtime::Runtime::new()?;

    let result = runtime.block_on(async {
        let (client, features) = DavConnector::new(config)
            .begin(credentials)
            .await
            .map_err(|e| Box::new(e) as Box<dyn std::error::Error>)?;

        match cli.command {
            Commands::Features => {
                println!("Server features:");
                for feature in &features {
                    println!("  {feature}");
                }
                Ok(())
            }
            Commands::Principal => cmd_principal(&client).await,
            Commands::ListCals => {
                let store = CalendarStore::new(client, resolver);
                cmd_list_cals(&store).await
            }
            Commands::ListBooks => {
                let store = AddressBookStore::new(client, resolver);
                cmd_list_books(&store).await
            }
            Commands::MkCal { id, name } => {
                let store = CalendarStore::new(client, resolver);
                cmd_mk_cal(&store, &id, name.as_deref()).await
            }
            Commands::RmCal { id } => {
                let store = CalendarStore::new(client, resolver);
                cmd_rm_cal(&store, &id).await
            }
            Commands::ListObjects { collection } => {
                let store = CalendarStore::new(client, resolver);
                cmd_list_objects(&store, &collection).await
            }
            Commands::Get { collection, name } => {
                let store = CalendarStore::new(client, resolver);
                cmd_get(&store, &collection, &name).await
            }
            Commands::Put {
                collection,
                name,
                input,
            } => {
                let store = CalendarStore::new(client, resolver);
                cmd_put(&store, &collection, &name, &input).await
            }
            Commands::Delete { collection, name } => {
                let store = CalendarStore::new(client, resolver);
                cmd_delete(&store, &collection, &name).await
            }
            Commands::Query {
                collection,
                start,
                end,
            } => {
                let store = CalendarStore::new(client, resolver);
                cmd_query(&store, &collection, &start, end.as_deref()).await
            }
            Commands::Delegations => cmd_delegations(&client).await,
        }
    });

    if let Err(e) = result {
        // Flush stdout before printing error
        std::io::stdout().flush().ok();
        eprintln!("{}", format_error(e));
        std::process::exit(1);
    }

    Ok(())
}
