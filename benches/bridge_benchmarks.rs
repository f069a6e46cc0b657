use contextbridge::{expose_api_in_main_world, Engine, Frame, Value};
use criterion::{black_box, criterion_group, criterion_main, Criterion};

fn demo_frame(keys: usize) -> (Engine, Frame) {
    let engine = Engine::new();
    let frame = Frame::new(&engine);
    let isolated = frame.isolated_world();

    let api = isolated.new_object();
    for i in 0..keys {
        api.set(&format!("field{}", i), Value::Int(i as i32));
    }
    api.set(
        "add",
        Value::Function(isolated.new_function("add", |_, args| {
            let a = args.first().and_then(Value::to_i32).unwrap_or(0);
            let b = args.get(1).and_then(Value::to_i32).unwrap_or(0);
            Ok(Value::Int(a + b))
        })),
    );
    expose_api_in_main_world(&frame, "api", &api).unwrap();
    (engine, frame)
}

fn bench_expose(c: &mut Criterion) {
    c.bench_function("expose api 64 keys", |b| {
        b.iter(|| {
            let (_engine, frame) = demo_frame(64);
            black_box(frame.main_world().global().get("api"))
        })
    });
}

fn bench_call_round_trip(c: &mut Criterion) {
    let (engine, frame) = demo_frame(0);
    let api = frame.main_world().global().get("api").unwrap();
    let add = api
        .as_object()
        .unwrap()
        .get("add")
        .and_then(|v| v.as_function().cloned())
        .unwrap();

    c.bench_function("proxied call round trip", |b| {
        b.iter(|| {
            black_box(
                engine
                    .call(frame.main_world(), &add, &[Value::Int(2), Value::Int(3)])
                    .unwrap(),
            )
        })
    });
}

fn bench_marshal_object_graph(c: &mut Criterion) {
    use contextbridge::bridge::{pass_value_to_other_context, FrameStore};
    use std::rc::Rc;

    let engine = Engine::new();
    let src = engine.new_context("src");
    let dst = engine.new_context("dst");
    let store = Rc::new(FrameStore::new());

    let root = src.new_object();
    for i in 0..32 {
        let child = src.new_object();
        child.set("n", Value::Int(i));
        child.set("label", src.new_string("node"));
        root.set(&format!("child{}", i), Value::Object(child));
    }
    let value = Value::Object(root);

    c.bench_function("marshal 32-node object graph", |b| {
        b.iter(|| black_box(pass_value_to_other_context(&engine, &src, &dst, &value, &store)))
    });
}

criterion_group!(benches, bench_expose, bench_call_round_trip, bench_marshal_object_graph);

criterion_main!(benches);
