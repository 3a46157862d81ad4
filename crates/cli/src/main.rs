use clap::Parser;
use tokio_util::sync::CancellationToken;

use courier_common::config::AppConfig;
use courier_common::types::NotificationEvent;
use courier_notifier::TelegramNotifier;

/// Send a single notification to the configured Telegram chat.
///
/// Credentials come from the environment (or a `.env` file):
/// TELEGRAM_BOT_TOKEN, TELEGRAM_CHAT_ID.
#[derive(Debug, Parser)]
#[command(name = "courier-notify", version, about)]
struct Args {
    /// Bold title line
    #[arg(short, long)]
    title: String,

    /// Freeform message body; takes precedence over --field
    #[arg(short, long)]
    message: Option<String>,

    /// Field rendered as a list entry, as key=value (repeatable, kept in order)
    #[arg(short, long = "field", value_name = "KEY=VALUE", value_parser = parse_field)]
    fields: Vec<(String, String)>,
}

fn parse_field(raw: &str) -> Result<(String, String), String> {
    NotificationEvent::parse_field(raw).map_err(|e| e.to_string())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "courier_notifier=info,courier_cli=info".into()),
        )
        .json()
        .init();

    let args = Args::parse();

    // Load configuration
    let config = AppConfig::from_env()?;

    let cancel = CancellationToken::new();
    let notifier = TelegramNotifier::from_config(&config)?.with_cancellation(cancel.clone());

    let event = NotificationEvent {
        title: args.title,
        message: args.message,
        fields: args.fields,
    };

    // Ctrl+C aborts a delivery stuck in transient retries
    let shutdown = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("Received shutdown signal, cancelling delivery...");
            shutdown.cancel();
        }
    });

    let outcome = notifier.send_event(&event).await;
    if outcome.is_sent() {
        tracing::info!(outcome = %outcome, "Notification finished");
    } else {
        tracing::warn!(outcome = %outcome, "Notification was not delivered");
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_args_keep_field_order() {
        let args = Args::try_parse_from([
            "courier-notify",
            "--title",
            "Service updated",
            "-f",
            "service_name=web",
            "--field",
            "image=nginx:1.27",
        ])
        .unwrap();
        assert_eq!(args.title, "Service updated");
        assert_eq!(args.message, None);
        assert_eq!(
            args.fields,
            vec![
                ("service_name".to_string(), "web".to_string()),
                ("image".to_string(), "nginx:1.27".to_string()),
            ]
        );
    }

    #[test]
    fn test_malformed_field_is_usage_error() {
        let result =
            Args::try_parse_from(["courier-notify", "--title", "T", "--field", "no_equals"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_message_flag() {
        let args =
            Args::try_parse_from(["courier-notify", "-t", "Deploy", "-m", "done"]).unwrap();
        assert_eq!(args.message.as_deref(), Some("done"));
        assert!(args.fields.is_empty());
    }
}
