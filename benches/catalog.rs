use std::hint::black_box;
use std::path::Path;

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use section_catalog::report::{render_catalog, ReportFormat};
use section_catalog::{extract_sections, Catalog, Config};

// ---------------------------------------------------------------------------
// HTML fixtures
// ---------------------------------------------------------------------------

/// Landing page: a hero, a few feature sections and a footer.
const SMALL_HTML: &str = r#"<!DOCTYPE html>
<html>
<head><title>Test</title></head>
<body>
<section class="hero dark"><h1 class="title">Welcome</h1><img class="logo" loading="lazy"></section>
<section class="features"><div class="card"><h2>One</h2><p>Text</p></div><div class="card"><h2>Two</h2><p>Text</p></div></section>
<div class="cta-section"><a class="btn" role="button">Go</a></div>
<section class="footer"><p>Copyright</p></section>
</body>
</html>"#;

/// Page with `n` repeated card sections, each nesting a small grid.
fn page_with_sections(n: usize) -> String {
    let mut s = String::from("<!DOCTYPE html><html><head><title>Page</title></head><body>\n");
    for i in 0..n {
        s.push_str(&format!(
            "<section class=\"block block-{}\"><div class=\"row\">\
             <div class=\"col\"><img class=\"thumb\" loading=\"lazy\"><p>Item {i}</p></div>\
             <div class=\"col\"><button type=\"button\" class=\"btn\">More</button></div>\
             </div></section>\n",
            i % 5
        ));
        if i % 10 == 0 {
            s.push_str("<div class=\"section-divider\"><hr></div>\n");
        }
    }
    s.push_str("</body></html>");
    s
}

// ---------------------------------------------------------------------------
// Benchmarks
// ---------------------------------------------------------------------------

/// Extraction at three document sizes.
fn bench_extract(c: &mut Criterion) {
    let config = Config::default();
    let inputs: &[(&str, String)] = &[
        ("small", SMALL_HTML.to_string()),
        ("medium", page_with_sections(20)),
        ("large", page_with_sections(200)),
    ];

    let mut group = c.benchmark_group("extract_sections");
    for (id, html) in inputs {
        group.bench_with_input(BenchmarkId::from_parameter(id), html, |b, html| {
            b.iter(|| extract_sections(black_box(html), Path::new("bench.html"), &config))
        });
    }
    group.finish();
}

/// Grouping and rendering over many files' worth of records.
fn bench_catalog(c: &mut Criterion) {
    let config = Config::default();
    let html = page_with_sections(20);
    let records: Vec<_> = (0..50)
        .flat_map(|i| {
            let file = format!("site/page-{i}.html");
            extract_sections(&html, Path::new(&file), &config)
        })
        .collect();

    let mut group = c.benchmark_group("catalog");
    group.bench_function("from_records", |b| {
        b.iter(|| Catalog::from_records(black_box(records.clone()), &config))
    });

    let catalog = Catalog::from_records(records.clone(), &config);
    group.bench_function("render_plain", |b| {
        b.iter(|| render_catalog(black_box(&catalog), ReportFormat::Plain, &config))
    });
    group.bench_function("render_markdown", |b| {
        b.iter(|| render_catalog(black_box(&catalog), ReportFormat::Markdown, &config))
    });
    group.finish();
}

criterion_group!(benches, bench_extract, bench_catalog);
criterion_main!(benches);
