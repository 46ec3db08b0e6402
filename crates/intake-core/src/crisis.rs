//! Static crisis resources surfaced whenever crisis language is detected.

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CrisisResource {
    pub name: &'static str,
    pub contact: &'static str,
    pub instructions: &'static str,
}

pub const CRISIS_RESOURCES: [CrisisResource; 3] = [
    CrisisResource {
        name: "988 Suicide & Crisis Lifeline",
        contact: "988",
        instructions: "Call or text 988, available 24/7",
    },
    CrisisResource {
        name: "Crisis Text Line",
        contact: "741741",
        instructions: "Text HOME to 741741",
    },
    CrisisResource {
        name: "Emergency Services",
        contact: "911",
        instructions: "Call 911 if your child is in immediate danger",
    },
];

/// Plain-text rendering of [`CRISIS_RESOURCES`] for a system chat message.
pub fn crisis_message() -> String {
    let mut text = String::from(
        "It sounds like your child may be going through something very serious. \
         If anyone is in danger right now, please reach out immediately:\n",
    );
    for resource in CRISIS_RESOURCES {
        text.push_str(&format!("- {}: {}\n", resource.name, resource.instructions));
    }
    text
}
