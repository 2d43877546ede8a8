use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;

use dgadmin::api::most_likely::QuestionId;
use dgadmin::api::silly_questions::SillyQuestionId;
use dgadmin::api::this_or_that::PairingId;
use dgadmin::{
    util, AdminResult, ApiClient, AppConfig, ConfigManager, CredentialStore, DashboardSync,
    MostLikelyApi, MostLikelyQuestion, SillyQuestion, SillyQuestionsApi, ThisOrThatApi,
    ThisOrThatPairing,
};

/// デイリーゲーム管理コンソール
#[derive(Parser)]
#[command(name = "dgadmin", version, about = "Daily games admin console")]
struct Cli {
    /// APIベースURL（設定ファイルより優先）
    #[arg(long, global = true)]
    base_url: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Store API credentials
    Login {
        #[arg(long)]
        api_key: String,
        #[arg(long)]
        signature: String,
    },
    /// Remove stored credentials
    Logout,
    /// Show credential and config status
    Status,
    /// Manage This-or-That pairings
    #[command(subcommand)]
    ThisOrThat(ThisOrThatCommand),
    /// Manage Most-Likely questions
    #[command(subcommand)]
    MostLikely(MostLikelyCommand),
    /// Manage Silly questions
    #[command(subcommand)]
    Silly(SillyCommand),
    /// Fetch all three lists for a date
    Dashboard { date: NaiveDate },
}

#[derive(Subcommand)]
enum ThisOrThatCommand {
    /// Create a pairing
    Post {
        #[arg(long)]
        option1: String,
        #[arg(long)]
        option2: String,
        #[arg(long)]
        date: NaiveDate,
    },
    /// List pairings for a date
    List { date: NaiveDate },
    /// Delete a pairing by id
    Delete { id: String },
}

#[derive(Subcommand)]
enum MostLikelyCommand {
    /// Create a question, optionally uploading an image first
    Post {
        #[arg(long)]
        question: String,
        #[arg(long)]
        date: NaiveDate,
        /// 画像ファイル（jpeg/jpg/pngのみ、送信時にアップロード）
        #[arg(long)]
        image: Option<PathBuf>,
    },
    /// List questions for a date
    List { date: NaiveDate },
    /// Delete a question by id
    Delete { id: String },
}

#[derive(Subcommand)]
enum SillyCommand {
    /// Create a question
    Post {
        #[arg(long)]
        question: String,
        #[arg(long)]
        date: NaiveDate,
    },
    /// Fetch the question for a date
    Daily { date: NaiveDate },
    /// Delete a question by id
    Delete { id: String },
}

#[tokio::main]
async fn main() {
    // エラーはここで一元的にユーザーへ報告する
    if let Err(error) = run().await {
        eprintln!("error: {}", error);
        std::process::exit(1);
    }
}

async fn run() -> AdminResult<()> {
    let cli = Cli::parse();

    let config_manager = ConfigManager::new()?;

    // ログレベルは設定から来るため、初期化前に一度読んでレベルだけ決める。
    // 読み込みの警告は初期化後の本読み込みで改めて出す
    let log_level = config_manager
        .load_config()
        .map(|config| config.log.log_level)
        .unwrap_or_else(|_| AppConfig::default().log.log_level);
    util::init_logging(&log_level)?;

    let mut config = config_manager.load_config().unwrap_or_else(|error| {
        tracing::warn!("⚙️ Failed to load config, using defaults: {}", error);
        AppConfig::default()
    });
    if let Some(base_url) = cli.base_url {
        config.api_base_url = base_url;
    }

    let store = Arc::new(CredentialStore::with_default_dir()?);
    let client = Arc::new(ApiClient::new(
        &config.api_base_url,
        config.request_timeout_ms,
        Arc::clone(&store),
    )?);

    match cli.command {
        Command::Login { api_key, signature } => {
            store.set_credentials(&api_key, &signature)?;
            println!("credentials stored");
        }
        Command::Logout => {
            store.clear_credentials()?;
            println!("credentials cleared");
        }
        Command::Status => {
            println!("api base url: {}", client.base_url());
            println!(
                "credentials: {}",
                if store.has_credentials() {
                    "present"
                } else {
                    "absent"
                }
            );
        }
        Command::ThisOrThat(command) => run_this_or_that(command, client).await?,
        Command::MostLikely(command) => run_most_likely(command, client).await?,
        Command::Silly(command) => run_silly(command, client).await?,
        Command::Dashboard { date } => run_dashboard(date, client).await,
    }

    Ok(())
}

async fn run_this_or_that(command: ThisOrThatCommand, client: Arc<ApiClient>) -> AdminResult<()> {
    let api = ThisOrThatApi::new(client);

    match command {
        ThisOrThatCommand::Post {
            option1,
            option2,
            date,
        } => {
            let created = api
                .post_pairing(&ThisOrThatPairing {
                    option1_text: option1,
                    option2_text: option2,
                    date,
                })
                .await?;
            match created {
                Some(pairing) => println!("created pairing {}", pairing.pairing_id),
                None => println!("created"),
            }
        }
        ThisOrThatCommand::List { date } => {
            let pairings = api.get_pairings(date).await?;
            if pairings.is_empty() {
                println!("no pairings for {}", date);
            }
            for pairing in pairings {
                println!(
                    "{}  {} vs {}",
                    pairing.pairing_id, pairing.option1.option_text, pairing.option2.option_text
                );
            }
        }
        ThisOrThatCommand::Delete { id } => {
            api.delete_pairing(&PairingId(id)).await?;
            println!("deleted");
        }
    }

    Ok(())
}

async fn run_most_likely(command: MostLikelyCommand, client: Arc<ApiClient>) -> AdminResult<()> {
    let api = MostLikelyApi::new(client);

    match command {
        MostLikelyCommand::Post {
            question,
            date,
            image,
        } => {
            let created = match image {
                Some(path) => api.post_question_with_image(&question, date, &path).await?,
                None => {
                    api.post_question(&MostLikelyQuestion {
                        question_text: question,
                        image_url: None,
                        date,
                    })
                    .await?
                }
            };
            match created {
                Some(question) => println!("created question {}", question.question_id),
                None => println!("created"),
            }
        }
        MostLikelyCommand::List { date } => {
            let questions = api.get_questions(date).await?.most_likely_questions;
            if questions.is_empty() {
                println!("no questions for {}", date);
            }
            for question in questions {
                match question.image_url {
                    Some(image_url) => println!(
                        "{}  {} [image: {}]",
                        question.question_id, question.question_text, image_url
                    ),
                    None => println!("{}  {}", question.question_id, question.question_text),
                }
            }
        }
        MostLikelyCommand::Delete { id } => {
            api.delete_question(&QuestionId(id)).await?;
            println!("deleted");
        }
    }

    Ok(())
}

async fn run_silly(command: SillyCommand, client: Arc<ApiClient>) -> AdminResult<()> {
    let api = SillyQuestionsApi::new(client);

    match command {
        SillyCommand::Post { question, date } => {
            let created = api.post_question(&SillyQuestion { question, date }).await?;
            match created {
                Some(question) => println!("created question {}", question.question_id),
                None => println!("created"),
            }
        }
        SillyCommand::Daily { date } => match api.get_daily_question(date).await? {
            Some(question) => println!("{}  {}", question.question_id, question.question),
            None => println!("no silly question for {}", date),
        },
        SillyCommand::Delete { id } => {
            api.delete_question(&SillyQuestionId(id)).await?;
            println!("deleted");
        }
    }

    Ok(())
}

async fn run_dashboard(date: NaiveDate, client: Arc<ApiClient>) {
    let sync = DashboardSync::new(client, date);
    let report = sync.select_date(date).await;
    let snapshot = sync.snapshot();

    println!("== dashboard for {} ==", snapshot.selected_date);

    println!("-- this or that --");
    match report.this_or_that {
        Some(error) => eprintln!("error: {}", error),
        None if snapshot.pairings.is_empty() => println!("(none)"),
        None => {
            for pairing in &snapshot.pairings {
                println!(
                    "{}  {} vs {}",
                    pairing.pairing_id, pairing.option1.option_text, pairing.option2.option_text
                );
            }
        }
    }

    println!("-- most likely --");
    match report.most_likely {
        Some(error) => eprintln!("error: {}", error),
        None if snapshot.most_likely.is_empty() => println!("(none)"),
        None => {
            for question in &snapshot.most_likely {
                println!("{}  {}", question.question_id, question.question_text);
            }
        }
    }

    println!("-- silly --");
    match report.silly {
        Some(error) => eprintln!("error: {}", error),
        None => match &snapshot.silly {
            Some(question) => println!("{}  {}", question.question_id, question.question),
            None => println!("(none)"),
        },
    }
}
