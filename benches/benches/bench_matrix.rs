use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use forecast_math::Matrix;

fn make_matrix(n: usize) -> Matrix {
    let rows: Vec<Vec<f64>> = (0..n)
        .map(|i| (0..n).map(|j| if i == j { (i + 1) as f64 * 2.0 } else { ((i + j) % 3) as f64 }).collect())
        .collect();
    Matrix::from_rows(rows).unwrap()
}

fn bench_inverse(c: &mut Criterion) {
    let mut group = c.benchmark_group("matrix_inverse");
    for n in [2usize, 3, 6, 10] {
        let m = make_matrix(n);
        group.throughput(Throughput::Elements(1));
        group.bench_function(format!("n{n}"), |b| {
            b.iter(|| black_box(&m).inverse().unwrap());
        });
    }
    group.finish();
}

criterion_group!(benches, bench_inverse);
criterion_main!(benches);
