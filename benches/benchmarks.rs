use chunkview::chunk::ChunkParser;
use chunkview::renderer::VirtualizedRenderer;
use chunkview::sanitize::Sanitizer;
use chunkview::streaming::WordBudgetChunker;
use criterion::{Criterion, black_box, criterion_group, criterion_main};

/// A document of roughly `sections * 60` words with mixed block types
fn generate_document(sections: usize) -> String {
    let mut html = String::from("<main>");
    for i in 0..sections {
        html.push_str(&format!("<h2>Section {i}</h2>"));
        html.push_str(&format!(
            "<p onclick=\"track({i})\">{}</p>",
            "lorem ipsum dolor sit amet ".repeat(8)
        ));
        html.push_str("<table><tr><th>Key</th><th>Value</th></tr><tr><td>a</td><td>1</td></tr></table>");
        html.push_str("<pre><code class=\"language-rust\">fn main() {\n    println!(\"hi\");\n}</code></pre>");
        html.push_str("<ul><li>one</li><li>two</li><li>three</li></ul>");
    }
    html.push_str("</main>");
    html
}

fn benchmark_chunking(c: &mut Criterion) {
    let html = generate_document(500);
    let chunker = WordBudgetChunker::default();

    c.bench_function("chunk_by_word_budget", |b| {
        b.iter(|| black_box(chunker.chunk_by_word_budget(black_box(&html))))
    });
}

fn benchmark_pipeline(c: &mut Criterion) {
    let mut group = c.benchmark_group("pipeline");
    let html = generate_document(100);
    let sanitizer = Sanitizer::new();
    let parser = ChunkParser::new();
    let clean = sanitizer.process_chunk(&html);

    group.bench_function("process_chunk", |b| {
        b.iter(|| black_box(sanitizer.process_chunk(black_box(&html))))
    });

    group.bench_function("parse_chunks", |b| {
        b.iter(|| black_box(parser.parse_str(black_box(&clean))))
    });

    group.finish();
}

fn benchmark_rendering(c: &mut Criterion) {
    let chunks = ChunkParser::new().parse_str(&generate_document(2000));
    let mut renderer = VirtualizedRenderer::default();
    renderer.set_chunks(chunks);
    renderer.render();

    c.bench_function("scroll_and_render", |b| {
        let mut offset = 0.0;
        b.iter(|| {
            offset = (offset + 397.0) % renderer.total_height().max(1.0);
            renderer.scroll_to(offset);
            black_box(renderer.render())
        })
    });
}

criterion_group!(benches, benchmark_chunking, benchmark_pipeline, benchmark_rendering);
criterion_main!(benches);
