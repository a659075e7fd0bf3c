use criterion::{Criterion, black_box, criterion_group, criterion_main};
use trawl::dom::{Document, HtmlParser};
use trawl::query::XPath;
use trawl::{PathBuilder, TrawlConfig, find_matches, full_xpath, relative_path};

/// A results page with `rows` cards under one list
fn catalog(rows: usize) -> Document {
    let mut html = String::from("<main><ul id=\"results\">");
    for i in 0..rows {
        html.push_str(&format!(
            "<li class=\"card\"><div><h3><a href=\"/item/{i}\">Item {i}</a></h3></div>\
             <span class=\"price\">{i}.99</span></li>"
        ));
    }
    html.push_str("</ul></main>");
    HtmlParser::new().parse(&html).unwrap()
}

/// Benchmark group for path synthesis
fn benchmark_paths(c: &mut Criterion) {
    let document = catalog(500);
    let config = TrawlConfig::default();
    let anchors = XPath::parse("//a")
        .unwrap()
        .evaluate(&document, document.root());
    let last = *anchors.last().unwrap();

    let mut group = c.benchmark_group("paths");
    group.bench_function("full_xpath", |b| {
        b.iter(|| black_box(full_xpath(&document, black_box(last))))
    });
    group.bench_function("css_selector", |b| {
        let builder = PathBuilder::new(&document, &config);
        b.iter(|| black_box(builder.css_selector(black_box(last))))
    });
    group.finish();
}

/// Benchmark group for pattern matching
fn benchmark_matching(c: &mut Criterion) {
    let document = catalog(500);
    let root = XPath::parse("//ul")
        .unwrap()
        .first(&document, document.root())
        .unwrap();
    let anchor = XPath::parse("//li[250]/div/h3/a")
        .unwrap()
        .first(&document, document.root())
        .unwrap();
    let pattern = relative_path(&document, anchor, root);

    let mut group = c.benchmark_group("matching");
    group.bench_function("exact", |b| {
        b.iter(|| black_box(find_matches(&document, black_box(&pattern), root, 3)))
    });
    group.bench_function("fallback", |b| {
        b.iter(|| black_box(find_matches(&document, "ol/li/div/h3/a", root, 3)))
    });
    group.finish();
}

fn benchmark_parsing(c: &mut Criterion) {
    c.bench_function("parse_catalog_500", |b| b.iter(|| black_box(catalog(500))));
}

criterion_group!(benches, benchmark_paths, benchmark_matching, benchmark_parsing);
criterion_main!(benches);
