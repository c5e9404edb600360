/// One-off log message classification
///
/// Classifies each argument with the configured provider and prints one
/// `category<TAB>message` line per input. With no arguments, runs a small
/// built-in demo set.
use log_classifier::llm_classifier::ClassifierClient;
use log_classifier::llm_config::LlmProviderConfig;

const DEMO_MESSAGES: &[&str] = &[
    "Case escalation for ticket ID 7324 failed because the assigned support agent is no longer active.",
    "The 'ReportGenerator' module will be retired in version 4.0. Please migrate to the 'AdvancedAnalyticsSuite' by Dec 2025",
    "System reboot initiated by user 12345.",
];

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file if present (fails silently if not found)
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt().with_target(false).init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let messages: Vec<&str> = if args.is_empty() {
        DEMO_MESSAGES.to_vec()
    } else {
        args.iter().map(|s| s.as_str()).collect()
    };

    let classifier = ClassifierClient::new(LlmProviderConfig::from_env())?;

    for message in messages {
        let category = classifier.classify(message).await?;
        println!("{}\t{}", category, message);
    }

    Ok(())
}
