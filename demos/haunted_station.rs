/// Haunted Station — compiles an embedded story and plays one route with
/// scripted input, printing everything the player emits.
///
/// Run with: cargo run --example haunted_station

use scenemark::{
    Compiler, Event, Input, OutputSink, Player, RuntimeState, ScriptedInput, Value,
};

const SCRIPT: &str = r#"
## Start

```transition
fade_in 1.5 (10, 10, 30)
```

The last train left an hour ago. The platform lights flicker.

```char
show porter tired 0.7 0.85
```

**Porter**: You missed it. Nothing runs till dawn.

![[Clock]]

- [Wait on the bench](Bench) set patience = 2
- [Follow the humming in the tunnel](Tunnel) set brave = true
- [Ask the porter about the humming](Porter)

## Clock

The station clock has stopped at 11:47.

## Porter

```char
expr porter uneasy
```

**Porter**: Don't go down there. Folks who follow it come back quiet.
@ warned = true
> Start

## Bench

@ patience = 3
You count the tiles. Something counts with you.
> Tunnel ? patience > 5
```ambience
loop wind_low.ogg
```
Dawn comes grey and ordinary.

## Tunnel

```char
move porter 0.9 0.85 2.0
hide porter
```

> Warned ? warned
The humming swells until it sounds like your name.
> Dark

## Warned

You remember the porter's face, and walk back up the stairs.

## Dark

```transition
fade_out 3.0
```
"#;

/// A sink that prints in a stage-script layout.
struct StageSink;

impl OutputSink for StageSink {
    fn say(&mut self, line: &str) {
        println!("  {}", line);
    }

    fn present(&mut self, event: &Event) {
        match event {
            Event::CodeBlock { lang, lines } => {
                println!("  <{} cue: {}>", lang, lines.join("; "))
            }
            other => println!("  ({})", other),
        }
    }

    fn prompt(&mut self, options: &[&str]) {
        println!();
        for (i, option) in options.iter().enumerate() {
            println!("    {}) {}", i + 1, option);
        }
    }

    fn reject(&mut self, input: &str) {
        println!("    '{}' is not an option", input);
    }
}

fn main() {
    let compilation = Compiler::default().compile(SCRIPT).unwrap();
    println!(
        "Compiled {} scenes: {}",
        compilation.graph.len(),
        compilation.graph.scene_names().collect::<Vec<_>>().join(", ")
    );
    for warning in &compilation.warnings {
        println!("warning: {}", warning);
    }

    let routes: [(&str, Vec<Input>); 2] = [
        ("ask the porter, then follow the humming", vec![
            Input::Ack,
            Input::Ack,
            Input::Ack,
            Input::from("3"),
            Input::Ack,
            Input::Ack,
            Input::Ack,
            Input::Ack,
            Input::from("two"),
            Input::from("2"),
            Input::Ack,
        ]),
        ("wait on the bench", vec![
            Input::Ack,
            Input::Ack,
            Input::Ack,
            Input::from("1"),
            Input::Ack,
            Input::Ack,
        ]),
    ];

    for (title, inputs) in routes {
        println!("\n=== Route: {} ===\n", title);
        let mut player = Player::builder(&compilation.graph)
            .state(RuntimeState::from_iter([("patience", Value::Int(0))]))
            .build()
            .unwrap();
        let mut input = ScriptedInput::new(inputs);
        let state = player.run(&mut input, &mut StageSink).unwrap();
        if input.remaining() > 0 {
            println!("\n  ({} inputs left unused)", input.remaining());
        }

        println!("\n  final state:");
        let mut vars: Vec<_> = state.iter().collect();
        vars.sort_by(|a, b| a.0.cmp(b.0));
        for (name, value) in vars {
            println!("    {} = {}", name, value);
        }
        for warning in player.warnings() {
            println!("  warning: {}", warning);
        }
    }
}
