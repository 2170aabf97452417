// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Mermaido and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Mermaid `sequenceDiagram` parsing.

pub mod sequence;

pub use sequence::{
    parse_sequence_diagram, transition_at_step, Arrow, ArrowHead, LineStyle, NotePlacement,
    Participant, SequenceItem, SequenceMessage, SequenceParseError, SequenceScript,
};
