use criterion::{Criterion, criterion_group, criterion_main};
use wikimark_engine::{HashLinkEncoder, MarkupRenderer, NoImages};

fn generate_page(sections: usize) -> String {
    let base = "= Section =\n[목차]\nSome **bold** and *italic* text with [[Another Page|a link]] and #tag.\nA note[* with [[Footnote Link]]]\n\n- item one\n- item two\n\n> quoted\n> text\n\n```rust\nfn example() {}\n```\n\n[docs](https://docs.rs) ![missing]\n\n";
    base.repeat(sections)
}

fn bench_render(c: &mut Criterion) {
    let mut group = c.benchmark_group("render");
    group.sample_size(10);

    let links = HashLinkEncoder::default();
    let renderer = MarkupRenderer::new(&NoImages, &links);

    for sections in [10, 100] {
        let content = generate_page(sections);
        group.bench_function(format!("render_{sections}_sections"), |b| {
            b.iter(|| std::hint::black_box(renderer.render(std::hint::black_box(content.as_str()))));
        });
        group.bench_function(format!("linked_pages_{sections}_sections"), |b| {
            b.iter(|| {
                std::hint::black_box(renderer.get_linked_pages(std::hint::black_box(content.as_str())))
            });
        });
    }

    group.finish();
}

criterion_group!(benches, bench_render);
criterion_main!(benches);
