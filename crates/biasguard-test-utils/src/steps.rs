use biasguard_protocol::{ConversationStep, Role};
use chrono::{DateTime, Duration, TimeZone, Utc};

fn at(hour: u32, minute: u32, second: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 1, 15, hour, minute, second)
        .single()
        .unwrap_or_default()
}

/// User step timestamped `step_index` minutes after 10:23.
pub fn user_step(id: &str, step_index: usize, turn_index: usize) -> ConversationStep {
    ConversationStep {
        id: id.to_string(),
        step_index,
        turn_index,
        role: Role::User,
        title: format!("User Input {step_index}"),
        text: format!("user message {step_index}"),
        rationale: String::new(),
        confidence: 100.0,
        timestamp: at(10, 23, 0) + Duration::minutes(step_index as i64),
        memory_references: None,
        attention_score: None,
    }
}

/// Assistant step with the given attention and memory references.
pub fn assistant_step(
    id: &str,
    step_index: usize,
    turn_index: usize,
    attention: f64,
    refs: Vec<&str>,
) -> ConversationStep {
    ConversationStep {
        id: id.to_string(),
        step_index,
        turn_index,
        role: Role::Assistant,
        title: format!("AI Response {step_index}"),
        text: format!("assistant message {step_index}"),
        rationale: String::new(),
        confidence: 90.0,
        timestamp: at(10, 23, 0) + Duration::minutes(step_index as i64),
        memory_references: Some(refs.into_iter().map(str::to_string).collect()),
        attention_score: Some(attention),
    }
}

#[allow(clippy::too_many_arguments)]
fn step(
    id: &str,
    turn_index: usize,
    role: Role,
    title: &str,
    text: &str,
    rationale: &str,
    confidence: f64,
    timestamp: DateTime<Utc>,
) -> ConversationStep {
    ConversationStep {
        id: id.to_string(),
        step_index: id.parse().unwrap_or_default(),
        turn_index,
        role,
        title: title.to_string(),
        text: text.to_string(),
        rationale: rationale.to_string(),
        confidence,
        timestamp,
        memory_references: None,
        attention_score: None,
    }
}

/// User steps carry a full attention score in the recorded demo data.
fn user(step: ConversationStep) -> ConversationStep {
    ConversationStep {
        attention_score: Some(100.0),
        ..step
    }
}

fn with_attention(mut step: ConversationStep, attention: f64, refs: &[&str]) -> ConversationStep {
    step.attention_score = Some(attention);
    step.memory_references = Some(refs.iter().map(|r| r.to_string()).collect());
    step
}

/// The six-step, three-turn headache conversation.
///
/// Assistant attention runs 95, 65, 30 and the final reply references nothing.
/// User steps are scored 100 as recorded.
pub fn headache_conversation() -> Vec<ConversationStep> {
    vec![
        user(step(
            "1",
            1,
            Role::User,
            "User Input: Initial Symptom",
            "I have a headache for 3 days",
            "User provides initial symptom information",
            100.0,
            at(10, 23, 15),
        )),
        with_attention(
            step(
                "2",
                1,
                Role::Assistant,
                "AI Analysis: Symptom Recognition",
                "Identified: persistent headache (3 days duration)",
                "System extracts key medical information",
                95.0,
                at(10, 23, 17),
            ),
            95.0,
            &["headache", "3 days"],
        ),
        user(step(
            "3",
            2,
            Role::User,
            "User Input: Additional Context",
            "It gets worse when I stand up",
            "User adds positional symptom detail",
            100.0,
            at(10, 24, 30),
        )),
        with_attention(
            step(
                "4",
                2,
                Role::Assistant,
                "AI Response: Updated Assessment",
                "This could indicate orthostatic hypotension",
                "AI incorporates new information but does not reference previous context",
                78.0,
                at(10, 24, 32),
            ),
            65.0,
            &["worse when standing"],
        ),
        user(step(
            "5",
            3,
            Role::User,
            "User Input: Follow-up Question",
            "Should I still get the CT scan you mentioned?",
            "User references the assistant's earlier recommendation",
            100.0,
            at(10, 25, 45),
        )),
        with_attention(
            step(
                "6",
                3,
                Role::Assistant,
                "AI Response: Memory Failure",
                "I didn't mention a CT scan. Let's focus on hydration first.",
                "AI fails to recall its own previous recommendation",
                82.0,
                at(10, 25, 48),
            ),
            30.0,
            &[],
        ),
    ]
}
