//! Benchmarks for rust-ai-tensor-bridge marshaling paths.

use candle_core::{DType, Device, Tensor};
use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use rust_ai_tensor_bridge::{
    bridge, code_from_scalar_type, scalar_type_from_code, DeviceDescriptor, TensorHandle,
};
use std::hint::black_box;

/// Benchmark handle creation and release (no tensor work).
fn bench_handle_lifecycle(c: &mut Criterion) {
    let mut group = c.benchmark_group("handle_lifecycle");

    group.bench_function("create_release", |b| {
        let tensor = Tensor::zeros(4, DType::F32, &Device::Cpu).unwrap();
        b.iter(|| {
            let raw = TensorHandle::new(tensor.clone()).into_raw();
            unsafe { bridge::delete::<Tensor>(black_box(raw)) }.unwrap();
        })
    });

    group.bench_function("resolve_sizes", |b| {
        let raw = TensorHandle::new(Tensor::zeros((8, 16, 32), DType::F32, &Device::Cpu).unwrap())
            .into_raw();
        b.iter(|| black_box(unsafe { bridge::sizes::<Tensor>(black_box(raw)) }.unwrap()));
        unsafe { bridge::delete::<Tensor>(raw) }.unwrap();
    });

    group.finish();
}

/// Benchmark code table lookups.
fn bench_code_tables(c: &mut Criterion) {
    let mut group = c.benchmark_group("code_tables");

    group.bench_function("dtype_from_code", |b| {
        b.iter(|| {
            for code in [0, 1, 2, 3, 6, 9, 10] {
                black_box(scalar_type_from_code(black_box(code)).unwrap());
            }
        })
    });

    group.bench_function("code_from_dtype", |b| {
        b.iter(|| {
            for dtype in [DType::F32, DType::BF16, DType::I64, DType::U8] {
                black_box(code_from_scalar_type(black_box(dtype)));
            }
        })
    });

    group.bench_function("device_descriptor", |b| {
        b.iter(|| black_box(DeviceDescriptor::from_array(black_box([0, -1])).unwrap()))
    });

    group.finish();
}

/// Benchmark raw byte extraction at various sizes.
fn bench_data_bytes(c: &mut Criterion) {
    let mut group = c.benchmark_group("data_bytes");

    for len in [1_024usize, 65_536, 1_048_576] {
        for dtype in [DType::F32, DType::BF16] {
            let raw = TensorHandle::new(Tensor::zeros(len, dtype, &Device::Cpu).unwrap()).into_raw();
            group.bench_with_input(
                BenchmarkId::new(format!("{dtype:?}"), len),
                &raw,
                |b, &raw| b.iter(|| black_box(unsafe { bridge::data_bytes::<Tensor>(raw) }.unwrap())),
            );
            unsafe { bridge::delete::<Tensor>(raw) }.unwrap();
        }
    }

    group.finish();
}

/// Benchmark handle-producing operations.
fn bench_tensor_ops(c: &mut Criterion) {
    let mut group = c.benchmark_group("tensor_ops");
    let raw = TensorHandle::new(Tensor::zeros((64, 64), DType::F32, &Device::Cpu).unwrap())
        .into_raw();
    let mask = TensorHandle::new(Tensor::ones((64, 64), DType::U8, &Device::Cpu).unwrap())
        .into_raw();

    group.bench_function("slice_step_1", |b| {
        b.iter(|| {
            let out = unsafe { bridge::slice::<Tensor>(raw, 0, 8, 56, 1) }.unwrap();
            unsafe { bridge::delete::<Tensor>(out) }.unwrap();
        })
    });

    group.bench_function("slice_step_4", |b| {
        b.iter(|| {
            let out = unsafe { bridge::slice::<Tensor>(raw, 1, 0, 64, 4) }.unwrap();
            unsafe { bridge::delete::<Tensor>(out) }.unwrap();
        })
    });

    group.bench_function("masked_select", |b| {
        b.iter(|| {
            let out = unsafe { bridge::masked_select::<Tensor>(raw, mask) }.unwrap();
            unsafe { bridge::delete::<Tensor>(out) }.unwrap();
        })
    });

    group.bench_function("to_bf16", |b| {
        b.iter(|| {
            let out = unsafe { bridge::to::<Tensor>(raw, 9, [0, -1], false) }.unwrap();
            unsafe { bridge::delete::<Tensor>(out) }.unwrap();
        })
    });

    group.finish();
    unsafe {
        bridge::delete::<Tensor>(mask).unwrap();
        bridge::delete::<Tensor>(raw).unwrap();
    }
}

criterion_group!(
    benches,
    bench_handle_lifecycle,
    bench_code_tables,
    bench_data_bytes,
    bench_tensor_ops,
);
criterion_main!(benches);
