use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use fitbook::flow::{ContextData, Flow, FlowError, StepControl, StepDef};
use fitbook::listing::{partition_bookings, search_classes, sorted_classes, ClassSort};
use fitbook::model::{Booking, ClassOffering};
use serde_json::json;
use tokio::runtime::Runtime;

// --- Fixtures ---

fn classes(n: usize) -> Vec<ClassOffering> {
  (0..n)
    .map(|i| {
      serde_json::from_value(json!({
        "_id": format!("class-{i}"),
        "title": format!("Class {i}"),
        "type": ["Yoga", "HIIT", "Pilates"][i % 3],
        "duration": 30 + (i * 7) % 60,
        "price": ((i * 37) % 90) as f64 + 10.0,
        "trainer": {"_id": format!("t-{}", i % 11), "name": "Trainer", "profile": {"rating": (i % 50) as f64 / 10.0}}
      }))
      .unwrap()
    })
    .collect()
}

fn bookings(n: usize) -> Vec<Booking> {
  let statuses = ["pending", "confirmed", "cancelled", "completed"];
  (0..n)
    .map(|i| {
      serde_json::from_value(json!({
        "_id": format!("b-{i}"),
        "class": format!("class-{}", i % 20),
        "date": "2026-10-19",
        "startTime": "09:00",
        "endTime": "10:00",
        "status": statuses[i % statuses.len()]
      }))
      .unwrap()
    })
    .collect()
}

// --- Benchmark Functions ---

fn bench_class_sorting(c: &mut Criterion) {
  let mut group = c.benchmark_group("ClassSort");
  for size in [10usize, 100, 1000] {
    let list = classes(size);
    group.throughput(Throughput::Elements(size as u64));
    for sort in [ClassSort::PriceLow, ClassSort::Rating, ClassSort::Newest] {
      group.bench_with_input(BenchmarkId::new(sort.as_str(), size), &list, |b, list| {
        b.iter(|| sorted_classes(list, sort))
      });
    }
  }
  group.finish();
}

fn bench_list_views(c: &mut Criterion) {
  let mut group = c.benchmark_group("ListViews");
  for size in [100usize, 1000] {
    let all_bookings = bookings(size);
    let all_classes = classes(size);
    group.throughput(Throughput::Elements(size as u64));
    group.bench_with_input(BenchmarkId::new("partition_bookings", size), &all_bookings, |b, list| {
      b.iter(|| partition_bookings(list))
    });
    group.bench_with_input(BenchmarkId::new("search_classes", size), &all_classes, |b, list| {
      b.iter(|| search_classes(list, "hiit"))
    });
  }
  group.finish();
}

fn bench_flow_run(c: &mut Criterion) {
  let mut group = c.benchmark_group("FlowRun");
  let rt = Runtime::new().unwrap();

  for num_steps in [1usize, 6, 20] {
    let names: Vec<String> = (0..num_steps).map(|i| format!("step_{i}")).collect();
    let mut flow: Flow<u64, FlowError> =
      Flow::new("bench", names.iter().map(|n| StepDef::required(n.clone())).collect()).unwrap();
    for name in &names {
      flow
        .on(name, |ctx: ContextData<u64>| async move {
          *ctx.write() += 1;
          Ok::<_, FlowError>(StepControl::Continue)
        })
        .unwrap();
    }

    group.bench_with_input(BenchmarkId::from_parameter(num_steps), &flow, |b, flow| {
      b.to_async(&rt).iter(|| async { flow.run(ContextData::new(0u64)).await.unwrap() })
    });
  }
  group.finish();
}

criterion_group!(benches, bench_class_sorting, bench_list_views, bench_flow_run);
criterion_main!(benches);
