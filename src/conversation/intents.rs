//! Keyword routing for messages that never reach the symptom pipeline.
//!
//! Non-ASCII keywords (Thai) match anywhere in the message; ASCII keywords must
//! stand on word boundaries so "hi" doesn't fire on "this".

pub const THANK_WORDS: &[&str] = &[
    "ขอบคุณ", "ขอบใจ", "ซาบซึ้ง", "thank you", "thanks",
];

pub const THANK_REPLIES: &[&str] = &[
    "You're welcome 😊 Let me know if there's anything else I can help with.",
    "My pleasure. Please take good care of yourself.",
    "Thank you too! If you have more health questions, feel free to ask any time.",
    "Thanks for talking with me. I wish you good health.",
];

pub const GREETING_WORDS: &[&str] = &["สวัสดี", "ดีครับ", "ดีค่ะ", "hello", "hi"];

pub const GREETING_REPLIES: &[&str] = &[
    "Hello, I'm a preliminary health assistant. If you feel unwell or want to talk about your health, just type your symptoms 💖",
    "Hello! I'm an AI assistant for basic health questions. Tell me what symptoms you have and I'll do my best to help 😊",
    "Hello, I'm here to listen and give basic health guidance. Feel free to ask anything 💬",
    "Hello, I'm a health assistant AI. Describe how you feel whenever you're ready, and take care of yourself.",
];

pub const HOW_ARE_YOU_WORDS: &[&str] = &["สบายดีไหม", "เป็นยังไงบ้าง", "how are you"];

pub const HOW_ARE_YOU_REPLIES: &[&str] = &[
    "Thanks for asking! I'm always ready to help with your health 😊",
    "I'm doing well, and I'm ready to look after your health.",
    "Thank you for checking in. Is there anything about your health you'd like to talk about?",
];

pub const MEDICATION_WORDS: &[&str] = &[
    "ยา", "medicine", "medicines", "medication", "medications", "drug", "drugs", "pill", "pills",
];

pub const MEDICATION_REFUSAL: &str = "Sorry, I can't recommend or prescribe medication. If something feels wrong, please talk to a pharmacist or a doctor directly.";

pub const CLARIFY_SYMPTOMS: &str = "Sorry, I couldn't recognize the symptoms you described. Please describe them more clearly, for example: headache, fever, cough. If you don't feel better, please see a doctor.";

pub const FALLBACK_REPLY: &str = "Sorry, I can't answer that right now. If you have unusual symptoms, please consult a doctor.";

pub const DISEASE_INFO_FALLBACK: &str = "Sorry, I can't provide information about that right now. If you have unusual symptoms, please consult a doctor.";

/// Non-conversational intent a message was routed to before symptom analysis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SmallTalk {
    Thanks,
    HowAreYou,
    Greeting,
}

impl SmallTalk {
    pub fn replies(&self) -> &'static [&'static str] {
        match self {
            SmallTalk::Thanks => THANK_REPLIES,
            SmallTalk::HowAreYou => HOW_ARE_YOU_REPLIES,
            SmallTalk::Greeting => GREETING_REPLIES,
        }
    }

    /// Pick a reply, rotating through the list with `seed`.
    pub fn reply(&self, seed: usize) -> &'static str {
        let replies = self.replies();
        replies[seed % replies.len()]
    }
}

/// Case-insensitive keyword test with the boundary rule described above.
pub fn contains_keyword(message: &str, keyword: &str) -> bool {
    let message = message.to_lowercase();
    let keyword = keyword.to_lowercase();
    if keyword.is_empty() {
        return false;
    }
    if !keyword.is_ascii() {
        return message.contains(&keyword);
    }

    message.match_indices(&keyword).any(|(start, matched)| {
        let end = start + matched.len();
        let before = message[..start].chars().next_back();
        let after = message[end..].chars().next();
        !before.is_some_and(char::is_alphanumeric) && !after.is_some_and(char::is_alphanumeric)
    })
}

pub fn contains_any(message: &str, keywords: &[&str]) -> bool {
    keywords.iter().any(|keyword| contains_keyword(message, keyword))
}

pub fn mentions_medication(message: &str) -> bool {
    contains_any(message, MEDICATION_WORDS)
}

/// The first known disease (in dataset order) named in the message.
pub fn find_disease_mention<'d>(message: &str, diseases: &'d [String]) -> Option<&'d str> {
    let lower = message.to_lowercase();
    diseases
        .iter()
        .filter(|disease| !disease.trim().is_empty())
        .find(|disease| message.contains(disease.as_str()) || lower.contains(&disease.to_lowercase()))
        .map(String::as_str)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ascii_keywords_need_word_boundaries() {
        assert!(contains_keyword("Hi there", "hi"));
        assert!(contains_keyword("oh, hi!", "hi"));
        assert!(!contains_keyword("this hurts", "hi"));
        assert!(contains_keyword("How are you today?", "how are you"));
    }

    #[test]
    fn test_thai_keywords_match_anywhere() {
        assert!(contains_keyword("ขอบคุณค่ะ", "ขอบคุณ"));
        assert!(mentions_medication("ควรกินยาอะไรดี"));
        assert!(!contains_keyword("anything", ""));
    }

    #[test]
    fn test_medication_words() {
        assert!(mentions_medication("Which medicine should I take?"));
        assert!(!mentions_medication("I have a headache"));
    }

    #[test]
    fn test_find_disease_mention() {
        let diseases = vec!["".to_string(), "Influenza".to_string(), "ไข้หวัด".to_string()];
        assert_eq!(find_disease_mention("do I have influenza?", &diseases), Some("Influenza"));
        assert_eq!(find_disease_mention("เป็นไข้หวัดหรือเปล่า", &diseases), Some("ไข้หวัด"));
        assert_eq!(find_disease_mention("just tired", &diseases), None);
    }

    #[test]
    fn test_replies_rotate() {
        assert_eq!(SmallTalk::Thanks.reply(0), THANK_REPLIES[0]);
        assert_eq!(SmallTalk::Thanks.reply(THANK_REPLIES.len() + 1), THANK_REPLIES[1]);
    }
}
