// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Mermaido and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

use mermaido::discovery::{discover_step_markers, SvgDocument};
use mermaido::engine::render_page;
use mermaido::format::mermaid::{parse_sequence_diagram, transition_at_step};
use mermaido::model::RenderSettings;

mod profiler;

// Group and case ids stay stable so results remain comparable across refactors.
const CASES: [(&str, usize); 3] = [("small", 3), ("medium", 40), ("large", 400)];

fn sequence_text(messages: usize) -> String {
    let participants = ["Alice", "Bob", "Carol", "Dave"];
    let mut text = String::from("sequenceDiagram\n");
    for idx in 0..messages {
        let from = participants[idx % participants.len()];
        let to = participants[(idx + 1) % participants.len()];
        let arrow = if idx % 3 == 0 { "-->>" } else { "->>" };
        text.push_str(&format!("    {from}{arrow}{to}: message number {idx}\n"));
    }
    text
}

fn benches_discovery(c: &mut Criterion) {
    let mut group = c.benchmark_group("discovery.markers");
    for (case_id, messages) in CASES {
        let page = render_page(&sequence_text(messages), RenderSettings::default())
            .expect("render_page");
        group.throughput(Throughput::Elements(messages as u64));
        group.bench_function(BenchmarkId::new("parse_and_scan", case_id), |b| {
            b.iter(|| {
                let doc = SvgDocument::parse(black_box(&page.svg)).expect("svg");
                black_box(discover_step_markers(&doc).len())
            })
        });

        let doc = SvgDocument::parse(&page.svg).expect("svg");
        group.bench_function(BenchmarkId::new("scan", case_id), |b| {
            b.iter(|| black_box(discover_step_markers(black_box(&doc)).len()))
        });
    }
    group.finish();
}

fn benches_transition(c: &mut Criterion) {
    let mut group = c.benchmark_group("discovery.transition");
    for (case_id, messages) in CASES {
        let text = sequence_text(messages);
        let last = messages;
        group.bench_function(BenchmarkId::new("from_text", case_id), |b| {
            b.iter(|| black_box(transition_at_step(black_box(&text), last)))
        });

        let script = parse_sequence_diagram(&text).expect("parse_sequence_diagram");
        group.bench_function(BenchmarkId::new("from_script", case_id), |b| {
            b.iter(|| black_box(script.transition_at_step(black_box(last))))
        });
    }
    group.finish();
}

criterion_group! {
    name = benches;
    config = profiler::criterion();
    targets = benches_discovery, benches_transition
}
criterion_main!(benches);
