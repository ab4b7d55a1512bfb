use anyhow::{anyhow, Result};
use clap::{Parser, Subcommand};
use client_core::{DurableSessionStore, PlanningClient, SubmitOutcome};
use shared::{
    domain::{Category, MatchStatus, MediaType},
    protocol::{CreatorSignup, ProductManagerSignup},
};

mod config;

#[derive(Parser, Debug)]
#[command(name = "planning", about = "Content planning and creator matching client")]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Author a draft and submit it for evaluation.
    Draft {
        #[arg(long)]
        title: String,
        #[arg(long)]
        content: String,
        #[arg(long)]
        media_type: String,
        #[arg(long)]
        category: String,
        /// Extra name=value attribute, repeatable.
        #[arg(long = "etc")]
        etc_fields: Vec<String>,
        /// Regenerate the summary once after an accepted evaluation.
        #[arg(long)]
        resummarize: bool,
    },
    /// List the drafts already submitted from this account.
    Records,
    /// Matching requests and their current status.
    Matches,
    /// Creators recommended for an accepted draft.
    Recommend {
        #[arg(long)]
        item_id: i64,
    },
    /// Drafts recommended to the signed-in creator.
    Offers,
    /// Register a creator account.
    SignupCreator {
        #[arg(long)]
        nickname: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        channel_id: String,
        #[arg(long)]
        channel_url: String,
        #[arg(long)]
        profile_image: String,
        #[arg(long)]
        subscribers: u64,
        #[arg(long)]
        media_type: String,
        #[arg(long)]
        category: String,
    },
    /// Register a product-manager account.
    SignupProductManager {
        #[arg(long)]
        nickname: String,
        #[arg(long)]
        email: String,
        /// Favorite category, repeatable.
        #[arg(long = "category")]
        categories: Vec<String>,
    },
    /// Store the credential carried by a login redirect URL.
    Login {
        #[arg(long)]
        redirect_url: String,
    },
    Logout,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt().init();
    let args = Args::parse();
    let settings = config::load_settings();

    let session = DurableSessionStore::initialize(&config::normalize_session_database_url(
        &settings.session_database_url,
    ))
    .await?;
    let client = PlanningClient::connect(settings.server_url, session);

    match args.command {
        Command::Draft {
            title,
            content,
            media_type,
            category,
            etc_fields,
            resummarize,
        } => {
            run_draft_flow(
                &client,
                &title,
                &content,
                &media_type,
                &category,
                &etc_fields,
                resummarize,
            )
            .await?;
        }
        Command::Records => {
            for record in client.list_drafts().await? {
                println!("#{} {} — {}", record.id.0, record.title, record.summary);
            }
        }
        Command::Matches => {
            for entry in client.list_matches().await? {
                println!(
                    "#{} {} — {}",
                    entry.id.0,
                    entry.title,
                    match_status_label(entry.status)
                );
            }
        }
        Command::Recommend { item_id } => {
            let creators = client
                .recommend_creators(shared::domain::DraftId(item_id))
                .await?;
            println!("{}", serde_json::to_string_pretty(&creators)?);
        }
        Command::Offers => {
            for record in client.recommend_drafts().await? {
                println!("#{} {} — {}", record.id.0, record.title, record.summary);
            }
        }
        Command::SignupCreator {
            nickname,
            email,
            channel_id,
            channel_url,
            profile_image,
            subscribers,
            media_type,
            category,
        } => {
            let role = client
                .signup_creator(&CreatorSignup {
                    nickname,
                    email,
                    channel_id,
                    channel_url,
                    profile_image,
                    subscribers,
                    media_type: parse_media_type(&media_type)?,
                    category: parse_category(&category)?,
                })
                .await?;
            println!("Signed up with role {role:?}. Complete login in the browser to receive a token.");
        }
        Command::SignupProductManager {
            nickname,
            email,
            categories,
        } => {
            let favorite_categories = categories
                .iter()
                .map(|raw| parse_category(raw))
                .collect::<Result<Vec<_>>>()?;
            let role = client
                .signup_product_manager(&ProductManagerSignup {
                    nickname,
                    email,
                    favorite_categories,
                })
                .await?;
            println!("Signed up with role {role:?}. Complete login in the browser to receive a token.");
        }
        Command::Login { redirect_url } => {
            let sanitized = client.bootstrap_from_redirect(&redirect_url).await?;
            match client.current_role().await? {
                Some(role) => println!("Logged in with role {role:?}."),
                None => println!("No credential found in the redirect URL."),
            }
            println!("Landing URL: {sanitized}");
        }
        Command::Logout => {
            client.logout().await?;
            println!("Logged out.");
        }
    }

    Ok(())
}

#[allow(clippy::too_many_arguments)]
async fn run_draft_flow(
    client: &PlanningClient,
    title: &str,
    content: &str,
    media_type: &str,
    category: &str,
    etc_fields: &[String],
    resummarize: bool,
) -> Result<()> {
    client.set_title(title).await;
    client.set_content(content).await;
    client.set_media_type(parse_media_type(media_type)?).await;
    client.set_category(parse_category(category)?).await;
    for pair in etc_fields {
        let (name, value) = pair
            .split_once('=')
            .ok_or_else(|| anyhow!("expected name=value, got '{pair}'"))?;
        client.push_etc_field(name, value).await;
    }

    match client.submit_draft().await {
        SubmitOutcome::Ignored => {
            return Err(anyhow!(
                "draft was not submitted; title, content, media type and category are required"
            ))
        }
        SubmitOutcome::Failed => return Err(anyhow!("draft submission failed; try again")),
        SubmitOutcome::Evaluated => {}
    }

    let snapshot = client.snapshot().await;
    if let Some(comment) = &snapshot.feedback {
        println!("Feedback");
        println!("{comment}");
        println!("Revise the draft and submit it again.");
        return Ok(());
    }

    if resummarize && client.resummarize().await == SubmitOutcome::Failed {
        eprintln!("summary regeneration failed; keeping the previous summary");
    }

    let snapshot = client.snapshot().await;
    let summary = snapshot
        .summary
        .ok_or_else(|| anyhow!("evaluation finished without a summary or feedback"))?;
    println!("{}", summary.title);
    println!();
    println!("{}", summary.content);
    if !summary.keywords.is_empty() {
        println!();
        println!("Keywords: {}", summary.keywords.join(", "));
    }

    if let Some(draft_id) = client.matching_reference().await {
        println!();
        println!("Draft #{} is ready for creator matching.", draft_id.0);
        match client.recommend_creators(draft_id).await {
            Ok(creators) => println!("{}", serde_json::to_string_pretty(&creators)?),
            Err(err) => eprintln!("creator recommendation unavailable: {err}"),
        }
    }

    Ok(())
}

fn parse_media_type(raw: &str) -> Result<MediaType> {
    match raw.to_ascii_uppercase().as_str() {
        "VIDEO" => Ok(MediaType::Video),
        "SHORTFORM" => Ok(MediaType::Shortform),
        "LIVE" => Ok(MediaType::Live),
        "AUDIO" => Ok(MediaType::Audio),
        other => Err(anyhow!("unknown media type '{other}'")),
    }
}

fn parse_category(raw: &str) -> Result<Category> {
    match raw.to_ascii_uppercase().as_str() {
        "TECH" => Ok(Category::Tech),
        "BEAUTY" => Ok(Category::Beauty),
        "FOOD" => Ok(Category::Food),
        "GAME" => Ok(Category::Game),
        "EDUCATION" => Ok(Category::Education),
        "TRAVEL" => Ok(Category::Travel),
        "FASHION" => Ok(Category::Fashion),
        "MUSIC" => Ok(Category::Music),
        "SPORTS" => Ok(Category::Sports),
        "ENTERTAINMENT" => Ok(Category::Entertainment),
        other => Err(anyhow!("unknown category '{other}'")),
    }
}

fn match_status_label(status: MatchStatus) -> &'static str {
    match status {
        MatchStatus::Accepted => "accepted",
        MatchStatus::Rejected => "rejected",
        MatchStatus::Pending => "pending",
        MatchStatus::Canceled => "canceled",
    }
}
