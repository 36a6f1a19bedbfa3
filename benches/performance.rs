use codesketch::core::CodebaseAnalyzer;
use codesketch::formatters::{CodeFormatter, RelationFormatter};
use criterion::{black_box, criterion_group, criterion_main, Criterion};
use std::path::Path;

fn write_fixtures(root: &Path) {
    for i in 0..20 {
        let python = format!(
            r#"from shared import Base{prev}

class Model{i}(Base{prev}):
    def __init__(self):
        self.value = {i}

    def process(self):
        return self.calculate() * 2

    def calculate(self):
        return self.value + 10

def build_{i}():
    return Model{i}()
"#,
            prev = i.max(1) - 1,
        );
        std::fs::write(root.join(format!("model_{i}.py")), python).unwrap();

        let script = format!(
            r#"import {{ Model{i} }} from './model_{i}';

export class View{i} {{
    constructor(model) {{
        this.model = model;
    }}

    render() {{
        return `${{this.model.value}}`;
    }}
}}

export const mount{i} = (el) => new View{i}(el);
"#
        );
        std::fs::write(root.join(format!("view_{i}.js")), script).unwrap();
    }
}

fn benchmark_analysis(c: &mut Criterion) {
    let dir = tempfile::TempDir::new().unwrap();
    write_fixtures(dir.path());
    let analyzer = CodebaseAnalyzer::new();

    let mut group = c.benchmark_group("codebase_analysis");

    group.bench_function("relations_depth_1", |b| {
        b.iter(|| {
            let relations = analyzer.analyze_relations(black_box(dir.path()), 1).unwrap();
            RelationFormatter::new(1).format(&relations)
        })
    });

    group.bench_function("relations_depth_3", |b| {
        b.iter(|| {
            let relations = analyzer.analyze_relations(black_box(dir.path()), 3).unwrap();
            RelationFormatter::new(3).format(&relations)
        })
    });

    group.bench_function("structure", |b| {
        b.iter(|| {
            let structure = analyzer.analyze_structure(black_box(dir.path()), None).unwrap();
            CodeFormatter::new().format(&structure)
        })
    });

    group.finish();
}

criterion_group!(benches, benchmark_analysis);
criterion_main!(benches);
