//! Classification throughput on a generated configuration

use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use httpdconf_config::{Define, DefineTable, classify, tokenize};
use httpdconf_core::{ConfigurationLine, ModuleInventory};

fn generate(vhosts: usize) -> Vec<ConfigurationLine> {
    let mut text = String::from("Define DOCROOT /var/www\nListen 80\n<IfModule ssl_module>\nListen 443 https\n</IfModule>\n");
    for i in 0..vhosts {
        text.push_str(&format!(
            "<VirtualHost *:80>\n    ServerName site{i}.example\n    DocumentRoot \"${{DOCROOT}}/site{i}\"\n    <IfModule !rewrite_module>\n        Redirect / https://site{i}.example/\n    </IfModule>\n    <Location /admin>\n        Require local\n    </Location>\n</VirtualHost>\n"
        ));
    }
    text.lines()
        .enumerate()
        .map(|(i, line)| ConfigurationLine::new(line, "/etc/httpd/conf/httpd.conf", i + 1))
        .collect()
}

fn bench_classify(c: &mut Criterion) {
    let modules = ModuleInventory::new(["core", "so"], ["ssl_module", "rewrite_module"]);
    let defines = DefineTable::new(vec![Define::new("DOCROOT", "/var/www")]);

    let mut group = c.benchmark_group("classify");
    for vhosts in [10, 100, 1000] {
        let lines = generate(vhosts);
        group.bench_with_input(BenchmarkId::from_parameter(vhosts), &lines, |b, lines| {
            b.iter(|| classify(black_box(lines), &defines, &modules, true))
        });
    }
    group.finish();
}

fn bench_tokenize(c: &mut Criterion) {
    c.bench_function("tokenize", |b| {
        b.iter(|| tokenize(black_box(r#"LogFormat "%h %l %u %t \"%r\" %>s %b" common , extra"#)))
    });
}

criterion_group!(benches, bench_classify, bench_tokenize);
criterion_main!(benches);
