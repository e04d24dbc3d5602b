use criterion::{criterion_group, criterion_main, Criterion};
use hmm::{Dag, FlatDag, Gl, SingleBaum};
use marker::{Allele, ChromTable, Marker, Nucleotide, Position};

struct HomRefGl {
    markers: Vec<Marker>,
    n_samples: usize,
}

impl HomRefGl {
    fn new(n_markers: usize, n_samples: usize) -> Self {
        let mut chroms = ChromTable::new();
        let chrom = chroms.intern("1").unwrap();
        let markers = (0..n_markers)
            .map(|i| {
                Marker::new(
                    chrom,
                    Position((i as u32 + 1) * 100),
                    vec![],
                    vec![Allele::Snv(Nucleotide::A), Allele::Snv(Nucleotide::G)].into(),
                    -1,
                )
                .unwrap()
            })
            .collect();
        Self { markers, n_samples }
    }
}

impl Gl for HomRefGl {
    fn n_markers(&self) -> usize {
        self.markers.len()
    }
    fn n_samples(&self) -> usize {
        self.n_samples
    }
    fn marker(&self, m: usize) -> &Marker {
        &self.markers[m]
    }
    fn gl(&self, _marker: usize, _sample: usize, a1: usize, a2: usize) -> f64 {
        if a1 == 0 && a2 == 0 {
            1.0
        } else {
            0.0
        }
    }
    fn is_phased(&self, _sample: usize) -> bool {
        false
    }
    fn allele1(&self, _marker: usize, _sample: usize) -> i32 {
        0
    }
    fn allele2(&self, _marker: usize, _sample: usize) -> i32 {
        0
    }
}

fn bench_single_baum_run(c: &mut Criterion) {
    let mut group = c.benchmark_group("single_baum");

    for n_markers in [50usize, 500] {
        let dag = FlatDag::uniform_self_loop(n_markers, 4);
        let gl = HomRefGl::new(n_markers, 1);

        group.bench_function(format!("forward_backward_sample_{n_markers}_markers"), |b| {
            b.iter(|| {
                let mut baum = SingleBaum::new(&dag, &gl, 0, 0, false, 1);
                baum.run(1, None).unwrap()
            });
        });
    }
}

criterion_group!(benches, bench_single_baum_run);
criterion_main!(benches);
