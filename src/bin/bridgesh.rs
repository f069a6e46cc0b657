//! Bridge shell
//!
//! Interactive playground for the context bridge: exposes a small demo API
//! from the isolated world and lets you poke at its main-world proxy.

use contextbridge::{expose_api_in_main_world, Engine, Frame, Value};
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use std::cell::RefCell;
use std::rc::Rc;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let engine = Engine::new();
    let frame = Frame::new(&engine);
    install_demo_api(&frame);

    println!("contextbridge shell");
    println!("Type `help` for commands, Ctrl+D to exit.\n");

    let mut editor = match DefaultEditor::new() {
        Ok(editor) => editor,
        Err(e) => {
            eprintln!("Error initializing editor: {}", e);
            std::process::exit(1);
        }
    };

    loop {
        match editor.readline("bridge> ") {
            Ok(line) => {
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }
                let _ = editor.add_history_entry(line);
                if !dispatch(&engine, &frame, line) {
                    break;
                }
            }
            Err(ReadlineError::Interrupted) => continue,
            Err(ReadlineError::Eof) => {
                println!();
                break;
            }
            Err(e) => {
                eprintln!("Error reading input: {}", e);
                break;
            }
        }
    }
}

fn install_demo_api(frame: &Frame) {
    let isolated = frame.isolated_world();

    let api = isolated.new_object();
    api.set("version", Value::Int(1));
    api.set(
        "add",
        Value::Function(isolated.new_function("add", |_, args| {
            let a = args.first().and_then(Value::to_i32).unwrap_or(0);
            let b = args.get(1).and_then(Value::to_i32).unwrap_or(0);
            Ok(Value::Int(a + b))
        })),
    );
    api.set(
        "greet",
        Value::Function(isolated.new_function("greet", |engine, args| {
            let ctx = engine.current_context().unwrap();
            let name = args
                .first()
                .and_then(Value::as_str)
                .unwrap_or("world")
                .to_owned();
            Ok(ctx.new_string(&format!("hello, {}", name)))
        })),
    );
    api.set(
        "fail",
        Value::Function(isolated.new_function("fail", |engine, _| {
            let ctx = engine.current_context().unwrap();
            Err(ctx.new_error("demo failure from the isolated world"))
        })),
    );

    // Counter held on the isolated side, mutated only through the API.
    let counter = Rc::new(RefCell::new(0i32));
    let slot = Rc::clone(&counter);
    api.set(
        "tick",
        Value::Function(isolated.new_function("tick", move |_, _| {
            *slot.borrow_mut() += 1;
            Ok(Value::Int(*slot.borrow()))
        })),
    );

    if let Err(e) = expose_api_in_main_world(frame, "demo", &api) {
        eprintln!("Error exposing demo API: {}", e);
    }
}

/// Returns false when the shell should exit
fn dispatch(engine: &Engine, frame: &Frame, line: &str) -> bool {
    let mut parts = line.split_whitespace();
    let command = parts.next().unwrap_or("");
    let args: Vec<&str> = parts.collect();

    match command {
        "help" => {
            println!("  keys              list properties of the exposed API");
            println!("  get <prop>        read a property of the exposed API");
            println!("  call <fn> [ints]  invoke an API function with integer arguments");
            println!("  pump              run queued microtasks");
            println!("  gc                run a collection cycle");
            println!("  count             show registered proxied functions");
            println!("  destroy           tear the frame down");
            println!("  quit              exit");
        }
        "keys" => match binding(frame) {
            Some(api) => {
                for key in api.own_keys().unwrap_or_default() {
                    println!("{}", key);
                }
            }
            None => println!("no API exposed"),
        },
        "get" => match (binding(frame), args.first()) {
            (Some(api), Some(prop)) => match api.get(prop) {
                Some(value) => println!("{}", value),
                None => println!("undefined"),
            },
            (None, _) => println!("no API exposed"),
            (_, None) => println!("usage: get <prop>"),
        },
        "call" => match (binding(frame), args.first()) {
            (Some(api), Some(name)) => {
                let func = api.get(name).and_then(|v| v.as_function().cloned());
                match func {
                    Some(func) => {
                        let call_args: Vec<Value> = args[1..]
                            .iter()
                            .map(|raw| match raw.parse::<i32>() {
                                Ok(n) => Value::Int(n),
                                Err(_) => frame.main_world().new_string(raw),
                            })
                            .collect();
                        match engine.call(frame.main_world(), &func, &call_args) {
                            Ok(result) => println!("{}", result),
                            Err(thrown) => println!("Error: {}", thrown),
                        }
                    }
                    None => println!("{} is not a function", name),
                }
            }
            (None, _) => println!("no API exposed"),
            (_, None) => println!("usage: call <fn> [ints]"),
        },
        "pump" => {
            engine.run_microtasks();
        }
        "gc" => {
            let collected = engine.collect_garbage();
            println!("collected {} monitored object(s)", collected);
        }
        "count" => {
            #[cfg(debug_assertions)]
            println!("{}", frame.proxied_function_count());
            #[cfg(not(debug_assertions))]
            println!("only available in debug builds");
        }
        "destroy" => {
            frame.destroy();
            println!("frame destroyed");
        }
        "quit" | "exit" => return false,
        _ => println!("unknown command: {} (try `help`)", command),
    }
    true
}

fn binding(frame: &Frame) -> Option<contextbridge::runtime::ObjectRef> {
    frame
        .main_world()
        .global()
        .get("demo")
        .and_then(|v| v.as_object().cloned())
}
