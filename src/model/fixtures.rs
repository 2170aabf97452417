// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Mermaido and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Diagram texts shared by unit tests.

pub(crate) const THREE_MESSAGES: &str = "sequenceDiagram
    Alice->>John: Hello John, how are you?
    John-->>Alice: Great!
    Alice-)John: See you later!
";

pub(crate) const TWO_MESSAGES: &str = "sequenceDiagram
    participant A as Alice
    participant B as Bob
    A->>B: ping
    B-->>A: pong
";

pub(crate) const FLOWCHART: &str = "flowchart LR
    A[Start] --> B{Ready?}
    B -->|yes| C[Go]
    B -->|no| A
";

pub(crate) const WITH_BLOCKS: &str = "sequenceDiagram
    autonumber
    actor U as User
    participant S as Server
    Note over U,S: handshake
    loop every minute
        U->>+S: poll
        S-->>-U: status
    end
    alt healthy
        S->>S: log ok
    else degraded
        S--xU: alert
    end
";

pub(crate) const MALFORMED: &str = "sequenceDiagram
    Alice->>John Hello without colon
";

pub(crate) fn long_sequence(messages: usize) -> String {
    let mut text = String::from("sequenceDiagram\n    participant A\n    participant B\n");
    for idx in 0..messages {
        if idx % 2 == 0 {
            text.push_str(&format!("    A->>B: request {idx}\n"));
        } else {
            text.push_str(&format!("    B-->>A: reply {idx}\n"));
        }
    }
    text
}
