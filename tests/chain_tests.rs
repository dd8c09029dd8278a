//! Tests for the three-stage triage chain.

mod common;

#[cfg(test)]
mod chain_tests {
    use std::sync::Arc;

    use super::common::{Scripted, ScriptedClient};
    use serde_json::json;
    use symptom_advisor::symptoms::{MatchedSymptoms, RankedDisease};
    use symptom_advisor::{ChainConfig, CompletionParams, Consistency, GuardOutcome, TriageChain};

    fn inputs() -> (MatchedSymptoms, Vec<RankedDisease>) {
        let symptoms = ["fever", "cough"].into_iter().collect();
        let ranked = vec![RankedDisease::new("Cold", 100.0, 2), RankedDisease::new("Flu", 50.0, 2)];
        (symptoms, ranked)
    }

    fn chain(responses: Vec<Scripted>) -> (TriageChain<ScriptedClient>, Arc<ScriptedClient>) {
        let client = Arc::new(ScriptedClient::new(responses));
        (TriageChain::new(client.clone(), ChainConfig::default()), client)
    }

    #[tokio::test]
    async fn test_full_chain() {
        let (chain, client) = chain(vec![
            Scripted::json(json!({"consistency": "partial", "comment": "Cough is less typical."})),
            Scripted::json(json!({"summary": "Symptoms resemble a cold.", "recommendation": "Rest and drink fluids."})),
            Scripted::text("Take care of yourself:\n• Rest well\n• Drink warm water\n"),
        ]);
        let (symptoms, ranked) = inputs();

        let report = chain.run(&symptoms, &ranked).await;

        assert_eq!(report.consistency_level(), Consistency::Partial);
        assert!(report.summary.is_validated());
        assert_eq!(
            report.reply.as_deref(),
            Ok("Take care of yourself:\n\n• Rest well\n\n• Drink warm water")
        );
        assert_eq!(report.ranking, ranked);

        let prompts = client.prompts();
        assert_eq!(prompts.len(), 3);
        assert!(prompts[0].contains("fever, cough"));
        assert!(prompts[0].contains("1. Cold 100% (2 symptoms)\n2. Flu 50% (2 symptoms)"));
        assert!(prompts[1].contains("Reviewer comment: Cough is less typical."));
        assert!(prompts[2].contains("Summary: Symptoms resemble a cold."));
        assert!(prompts[2].contains("Recommendation: Rest and drink fluids."));

        // every stage uses the chain parameters
        for params in client.params() {
            assert_eq!(params, CompletionParams::chain_stage());
        }
    }

    #[tokio::test]
    async fn test_failed_stages_degrade_to_defaults() {
        let (chain, client) = chain(vec![
            Scripted::Timeout,
            Scripted::text("not json at all"),
            Scripted::text("• See a doctor if it gets worse"),
        ]);
        let (symptoms, ranked) = inputs();

        let report = chain.run(&symptoms, &ranked).await;

        assert_eq!(report.consistency, GuardOutcome::UpstreamError("Timeout error".into()));
        assert_eq!(report.consistency_level(), Consistency::Unknown);
        assert!(matches!(report.summary, GuardOutcome::SchemaInvalid(_)));
        assert_eq!(report.reply.as_deref(), Ok("• See a doctor if it gets worse"));

        let prompts = client.prompts();
        assert!(prompts[1].contains("Reviewer comment: -"));
        assert!(prompts[2].contains("Summary: -"));
        assert!(prompts[2].contains("Recommendation: -"));
    }

    #[tokio::test]
    async fn test_reply_failure_is_reported() {
        let (chain, _client) = chain(vec![]);
        let (symptoms, ranked) = inputs();

        let report = chain.run(&symptoms, &ranked).await;
        assert!(report.reply.is_err());
        assert!(!report.consistency.is_validated());
    }

    #[tokio::test]
    async fn test_direct_answer_strips_greeting() {
        let (chain, client) = chain(vec![Scripted::json(json!({
            "answer": "สวัสดีค่ะ\nควรพักผ่อนให้เพียงพอ และพบแพทย์หากอาการไม่ดีขึ้น"
        }))]);
        let (symptoms, ranked) = inputs();

        let answer = chain.direct_answer(&symptoms, &ranked).await.validated().unwrap();
        assert_eq!(answer.answer, "ควรพักผ่อนให้เพียงพอ และพบแพทย์หากอาการไม่ดีขึ้น");
        assert_eq!(client.params()[0], CompletionParams::direct_answer());
    }

    #[tokio::test]
    async fn test_disease_info_prompt_names_disease() {
        let (chain, client) = chain(vec![Scripted::json(json!({"answer": "Influenza is a viral infection."}))]);

        let outcome = chain.disease_info("Influenza").await;
        assert!(outcome.is_validated());
        assert!(client.prompts()[0].contains("'Influenza'"));
    }

    #[tokio::test]
    async fn test_report_serializes_outcomes() {
        let (chain, _client) = chain(vec![
            Scripted::json(json!({"consistency": "consistent", "comment": ""})),
            Scripted::Api("down".into()),
        ]);
        let (symptoms, ranked) = inputs();
        let report = chain.run(&symptoms, &ranked).await;

        let value = serde_json::to_value(&report).unwrap();
        assert_eq!(value["consistency"]["status"], "validated");
        assert_eq!(value["summary"]["status"], "upstream_error");
        assert_eq!(value["symptoms"], json!(["fever", "cough"]));
    }
}
