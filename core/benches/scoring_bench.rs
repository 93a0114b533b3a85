use criterion::{criterion_group, criterion_main, Criterion};
use internmatch_core::dataset::load_dataset;
use internmatch_core::{find_matches, Catalog, MatchOptions, Profile};
use serde_json::json;

const SKILLS: &[&str] = &["Python", "PyTorch", "React", "Node", "SQL", "Excel", "Go", "Rust", "Figma", "Java"];
const CITIES: &[&str] = &["Bangalore", "Pune", "Delhi", "Remote", "Mumbai"];

fn catalog(n: usize) -> Catalog {
    let raw: Vec<_> = (0..n)
        .map(|i| {
            json!({
                "id": i,
                "title": format!("Intern {i}"),
                "location": CITIES[i % CITIES.len()],
                "education": if i % 2 == 0 { "B.Tech" } else { "BCA" },
                "sector": if i % 3 == 0 { "IT Services" } else { "Finance" },
                "skills": [SKILLS[i % SKILLS.len()], SKILLS[(i * 7 + 3) % SKILLS.len()]],
            })
        })
        .collect();
    Catalog::from_loaded(load_dataset(&raw))
}

fn bench_match(c: &mut Criterion) {
    let catalog = catalog(10_000);
    let profile = Profile {
        skills: vec!["py".into(), "sql".into()],
        education: "B".into(),
        sector: "IT".into(),
        location: "Pune".into(),
    };
    let opts = MatchOptions::default();
    c.bench_function("match_10k", |b| b.iter(|| find_matches(Some(&catalog), &profile, &opts)));
}

criterion_group!(benches, bench_match);
criterion_main!(benches);
