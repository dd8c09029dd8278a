use std::sync::Arc;

use symptom_advisor::{
    AdvisorConfig, ConversationSession, OpenAICompatibleClient, SymptomAdvisor,
    logging::{LogLevel, init_logging},
};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};

// Reads the dataset from SYMPTOM_ADVISOR_DATASET (or ./data/full_onehot_disease.csv)
// and needs TYPHOON_API_KEY set.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_logging(LogLevel::Info);

    let config = AdvisorConfig::from_env()?;
    let client = Arc::new(OpenAICompatibleClient::from_env()?.build());
    let advisor = SymptomAdvisor::from_config(&config, client)?;

    println!(
        "Loaded {} cases with {} known symptoms. Describe how you feel, or type 'exit'.",
        advisor.dataset().len(),
        advisor.dataset().vocabulary().len()
    );

    let mut session = ConversationSession::new();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdout = tokio::io::stdout();

    loop {
        stdout.write_all(b"> ").await?;
        stdout.flush().await?;

        let Some(line) = lines.next_line().await? else {
            break;
        };
        let message = line.trim();
        if message.is_empty() {
            continue;
        }
        if matches!(message, "exit" | "quit") {
            break;
        }

        let reply = advisor.reply(&mut session, message).await;
        println!("\n{}\n", reply.text);
        for disease in &reply.ranking {
            println!(
                "  [{} {}% of {} symptoms]",
                disease.disease_name, disease.average_match_percent, disease.symptom_count_used
            );
        }
    }

    println!("Take care! ({} turns)", session.turn_count());
    Ok(())
}
