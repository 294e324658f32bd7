use criterion::{
    criterion_group, criterion_main, AxisScale, BenchmarkId, Criterion, PlotConfiguration,
    Throughput,
};
use pixelcube::hypercube::HypercubeRequest;
use pixelcube::oracle::{assert_equivalent, reconstruct_solid, reconstruct_strided};
use pixelcube::pixels::{PixelType, PixelsDescriptor, PixelsDimensions};
use pixelcube::source::MemoryPixelsSource;

fn source(size: u64) -> MemoryPixelsSource {
    let descriptor =
        PixelsDescriptor::new(PixelsDimensions::new(size, size, size, 2, 2), PixelType::Uint16);
    let data = vec![0u8; descriptor.total_size().try_into().unwrap()];
    MemoryPixelsSource::new(descriptor, data).unwrap()
}

fn reconstruct(c: &mut Criterion) {
    let plot_config = PlotConfiguration::default().summary_scale(AxisScale::Logarithmic);
    let mut group = c.benchmark_group("reconstruct");
    group.plot_config(plot_config);

    for size in [16, 32, 64].iter() {
        let source = source(*size);
        let solid = HypercubeRequest::new_solid([0; 5], [*size, *size, *size, 2, 2]);
        group.throughput(Throughput::Bytes(solid.num_bytes(2)));
        group.bench_function(BenchmarkId::new("solid", size), |b| {
            b.iter(|| reconstruct_solid(&source, &solid).unwrap());
        });

        let strided = solid.with_step([2, 2, 1, 1, 1]).unwrap();
        group.throughput(Throughput::Bytes(strided.num_bytes(2)));
        group.bench_function(BenchmarkId::new("strided", size), |b| {
            b.iter(|| reconstruct_strided(&source, &strided).unwrap());
        });
    }
}

fn equivalence(c: &mut Criterion) {
    let mut group = c.benchmark_group("assert_equivalent");
    for size in [1 << 12, 1 << 16, 1 << 20] {
        let data = vec![0u8; size];
        group.throughput(Throughput::Bytes(size as u64));
        group.bench_function(BenchmarkId::from_parameter(size), |b| {
            b.iter(|| assert_equivalent(&data, &data).unwrap());
        });
    }
}

criterion_group!(benches, reconstruct, equivalence);
criterion_main!(benches);
