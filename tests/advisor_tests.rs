//! Tests for conversation routing in the symptom advisor.

mod common;

#[cfg(test)]
mod advisor_tests {
    use std::sync::Arc;

    use super::common::{Scripted, ScriptedClient, fixture, load_fixture};
    use serde_json::json;
    use symptom_advisor::conversation::intents::{
        CLARIFY_SYMPTOMS, FALLBACK_REPLY, GREETING_REPLIES, HOW_ARE_YOU_REPLIES, MEDICATION_REFUSAL,
        THANK_REPLIES,
    };
    use symptom_advisor::conversation::ChatRole;
    use symptom_advisor::symptoms::RankedDisease;
    use symptom_advisor::vision::UNASSESSABLE_IMAGE_REPLY;
    use symptom_advisor::{
        AdvisorConfig, AdvisorError, ConversationSession, ReplyKind, ReplyMode, Result, SkinClassification,
        SkinClassifier, SkinImage, SkinLabel, SymptomAdvisor,
    };

    fn advisor(
        config: AdvisorConfig,
        responses: Vec<Scripted>,
    ) -> (SymptomAdvisor<ScriptedClient>, Arc<ScriptedClient>) {
        let client = Arc::new(ScriptedClient::new(responses));
        let dataset = Arc::new(load_fixture("thai_symptoms.csv"));
        let advisor = SymptomAdvisor::new(dataset, client.clone(), &config).unwrap();
        (advisor, client)
    }

    fn chain_responses() -> Vec<Scripted> {
        vec![
            Scripted::json(json!({"consistency": "consistent", "comment": "Headache and fever fit influenza."})),
            Scripted::json(json!({"summary": "Possibly influenza.", "recommendation": "Rest and see a doctor."})),
            Scripted::text("Please rest:\n• Drink plenty of water\n• See a doctor if the fever stays high"),
        ]
    }

    #[tokio::test]
    async fn test_symptoms_run_the_chain() {
        let (advisor, client) = advisor(AdvisorConfig::default(), chain_responses());
        let mut session = ConversationSession::new();

        let reply = advisor.reply(&mut session, "ปวดหัว และ มีไข้").await;

        assert_eq!(reply.kind, ReplyKind::Triage);
        assert_eq!(
            reply.text,
            "Please rest:\n\n• Drink plenty of water\n\n• See a doctor if the fever stays high"
        );
        assert_eq!(reply.ranking, vec![RankedDisease::new("ไข้หวัดใหญ่", 100.0, 2)]);
        assert_eq!(client.calls(), 3);

        let triage = session.last_triage().expect("triage recorded");
        assert_eq!(triage.symptoms.as_slice(), ["ปวดหัว", "มีไข้"]);
        assert_eq!(session.turn_count(), 2);
        assert_eq!(session.history()[0].role, ChatRole::User);
        assert_eq!(session.history()[1].content, reply.text);
    }

    #[tokio::test]
    async fn test_top_n_from_config() {
        let (advisor, _client) = advisor(AdvisorConfig::default().top_n(2), chain_responses());
        let mut session = ConversationSession::new();

        let reply = advisor.reply(&mut session, "ปวดหัว และ มีไข้").await;
        assert_eq!(reply.ranking.len(), 2);
        assert_eq!(reply.ranking[1], RankedDisease::new("หวัด", 25.0, 2));
    }

    #[tokio::test]
    async fn test_chain_failure_falls_back() {
        let (advisor, _client) = advisor(AdvisorConfig::default(), vec![]);
        let mut session = ConversationSession::new();

        let reply = advisor.reply(&mut session, "ไอ, เจ็บคอ").await;
        assert_eq!(reply.kind, ReplyKind::Triage);
        assert_eq!(reply.text, FALLBACK_REPLY);
        assert!(reply.triage.unwrap().reply.is_err());
    }

    #[tokio::test]
    async fn test_unrecognized_symptoms_ask_for_clarification() {
        let (advisor, client) = advisor(AdvisorConfig::default(), vec![]);
        let mut session = ConversationSession::new();

        let reply = advisor.reply(&mut session, "xyzxyz999").await;
        assert_eq!(reply.kind, ReplyKind::ClarifySymptoms);
        assert_eq!(reply.text, CLARIFY_SYMPTOMS);
        assert!(reply.ranking.is_empty());
        assert_eq!(client.calls(), 0);
    }

    #[tokio::test]
    async fn test_greets_only_once() {
        let (advisor, client) = advisor(AdvisorConfig::default(), vec![]);
        let mut session = ConversationSession::new();

        let first = advisor.reply(&mut session, "สวัสดีครับ").await;
        assert_eq!(first.kind, ReplyKind::Greeting);
        assert_eq!(first.text, GREETING_REPLIES[0]);
        assert!(session.greeted());

        let second = advisor.reply(&mut session, "hello").await;
        assert_eq!(second.kind, ReplyKind::ClarifySymptoms);
        assert_eq!(client.calls(), 0);

        // a fresh session greets again
        let mut other = ConversationSession::new();
        assert_eq!(advisor.reply(&mut other, "hi").await.kind, ReplyKind::Greeting);
    }

    #[tokio::test]
    async fn test_small_talk_routes() {
        let (advisor, client) = advisor(AdvisorConfig::default(), vec![]);
        let mut session = ConversationSession::new();

        let thanks = advisor.reply(&mut session, "ขอบคุณมากครับ").await;
        assert_eq!(thanks.kind, ReplyKind::Thanks);
        assert_eq!(thanks.text, THANK_REPLIES[0]);

        let how = advisor.reply(&mut session, "How are you?").await;
        assert_eq!(how.kind, ReplyKind::HowAreYou);
        assert_eq!(how.text, HOW_ARE_YOU_REPLIES[1]);

        // thanks wins over a greeting in the same message
        let mut fresh = ConversationSession::new();
        let mixed = advisor.reply(&mut fresh, "hello, thank you").await;
        assert_eq!(mixed.kind, ReplyKind::Thanks);

        assert_eq!(client.calls(), 0);
    }

    #[tokio::test]
    async fn test_medication_requests_are_refused() {
        let (advisor, client) = advisor(AdvisorConfig::default(), vec![]);
        let mut session = ConversationSession::new();

        // even when symptoms are present
        let reply = advisor.reply(&mut session, "ปวดหัว ควรกินยาอะไร").await;
        assert_eq!(reply.kind, ReplyKind::MedicationRefusal);
        assert_eq!(reply.text, MEDICATION_REFUSAL);
        assert_eq!(client.calls(), 0);
    }

    #[tokio::test]
    async fn test_disease_mention_gets_information() {
        let (advisor, client) = advisor(
            AdvisorConfig::default(),
            vec![Scripted::json(json!({"answer": "Influenza is a viral infection. Please see a doctor."}))],
        );
        let mut session = ConversationSession::new();

        let reply = advisor.reply(&mut session, "ฉันเป็นไข้หวัดใหญ่หรือเปล่า").await;
        assert_eq!(reply.kind, ReplyKind::DiseaseInfo);
        assert_eq!(reply.text, "Influenza is a viral infection. Please see a doctor.");
        assert!(client.prompts()[0].contains("'ไข้หวัดใหญ่'"));
    }

    #[tokio::test]
    async fn test_direct_mode_outcomes() {
        let config = AdvisorConfig::default().reply_mode(ReplyMode::Direct);
        let (advisor, client) = advisor(
            config,
            vec![
                Scripted::json(json!({"answer": "สวัสดีครับ\nพักผ่อนให้เพียงพอ และพบแพทย์"})),
                Scripted::text("no json here"),
                Scripted::Timeout,
            ],
        );
        let mut session = ConversationSession::new();

        let validated = advisor.reply(&mut session, "ปวดหัว").await;
        assert_eq!(validated.kind, ReplyKind::DirectAnswer);
        assert_eq!(validated.text, "พักผ่อนให้เพียงพอ และพบแพทย์");
        assert!(validated.triage.is_none());
        assert_eq!(validated.ranking[0].disease_name, "ไข้หวัดใหญ่");

        let invalid = advisor.reply(&mut session, "ปวดหัว").await;
        assert_eq!(invalid.text, FALLBACK_REPLY);

        let upstream = advisor.reply(&mut session, "ปวดหัว").await;
        assert_eq!(upstream.text, "[ERROR] Timeout error");

        assert_eq!(client.calls(), 3);
        assert_eq!(session.turn_count(), 6);
    }

    struct FixedClassifier(Vec<f64>);

    impl SkinClassifier for FixedClassifier {
        fn classify(&self, _image: &SkinImage) -> Result<SkinClassification> {
            SkinClassification::from_probabilities(&self.0)
        }
    }

    struct BrokenClassifier;

    impl SkinClassifier for BrokenClassifier {
        fn classify(&self, _image: &SkinImage) -> Result<SkinClassification> {
            Err(AdvisorError::ClassifierError("model not loaded".into()))
        }
    }

    #[test]
    fn test_skin_image_assessment() {
        let (advisor, _client) = advisor(AdvisorConfig::default(), vec![]);
        let mut session = ConversationSession::new();
        let image = SkinImage::from_bytes(vec![0xFF, 0xD8, 0xFF], "image/jpeg").unwrap();

        let abnormal = advisor.assess_skin_image(&mut session, &FixedClassifier(vec![0.9, 0.1]), &image);
        assert_eq!(abnormal.kind, ReplyKind::SkinAssessment);
        assert_eq!(
            abnormal.text,
            SkinClassification::new(SkinLabel::Abnormal, 0.9).unwrap().describe()
        );
        assert!(abnormal.text.contains("90.00%"));

        let failed = advisor.assess_skin_image(&mut session, &BrokenClassifier, &image);
        assert_eq!(failed.text, UNASSESSABLE_IMAGE_REPLY);

        assert_eq!(session.turn_count(), 2);
        assert_eq!(session.history()[1].role, ChatRole::Assistant);
    }

    #[test]
    fn test_from_config_loads_dataset() {
        let config = AdvisorConfig::default().dataset_path(fixture("thai_symptoms.csv"));
        let advisor =
            SymptomAdvisor::from_config(&config, Arc::new(ScriptedClient::default())).unwrap();
        assert_eq!(advisor.dataset().len(), 5);
        assert_eq!(advisor.extract("เจ็บคอ").as_slice(), ["เจ็บคอ"]);

        let missing = AdvisorConfig::default().dataset_path(fixture("missing_label.csv"));
        assert!(matches!(
            SymptomAdvisor::from_config(&missing, Arc::new(ScriptedClient::default())),
            Err(AdvisorError::SchemaError(_))
        ));
    }
}
