//! Hero decisions typed on stdin.
use std::io::{self, BufRead, Write};
use std::sync::Arc;

use async_trait::async_trait;
use battle_core::ActionIntent;
use runtime::{ActionProvider, InputPrompt, Result, RuntimeError};
use tokio::sync::Mutex;

use crate::narrator::Narrator;

/// Asks the user for `<attack> <target>` (1-based) until the answer parses.
pub struct StdinActionProvider {
    narrator: Arc<Mutex<Narrator>>,
}

impl StdinActionProvider {
    pub fn new(narrator: Arc<Mutex<Narrator>>) -> Self {
        Self { narrator }
    }

    fn menu(narrator: &Narrator, prompt: &InputPrompt) -> String {
        let request = &prompt.request;
        let mut menu = format!("{}, choose an attack and a target:\n", narrator.name(request.actor));
        for (i, attack) in request.attacks.iter().enumerate() {
            menu.push_str(&format!("  attack {}: {}\n", i + 1, attack.name));
        }
        for (i, &target) in request.targets.iter().enumerate() {
            let hp = prompt
                .state
                .combatant(target)
                .map(|c| format!("{:.0}/{:.0} HP", c.stats.current_hp, c.stats.max_hp))
                .unwrap_or_default();
            menu.push_str(&format!("  target {}: {} {hp}\n", i + 1, narrator.name(target)));
        }
        menu
    }
}

/// Parses `"<attack> <target>"` into zero-based indices within bounds.
fn parse_choice(line: &str, attacks: usize, targets: usize) -> Option<(usize, usize)> {
    let mut parts = line.split_whitespace();
    let attack: usize = parts.next()?.parse().ok()?;
    // A lone attack number is enough when there is a single target.
    let target: usize = match parts.next() {
        Some(raw) => raw.parse().ok()?,
        None if targets == 1 => 1,
        None => return None,
    };
    if parts.next().is_some() {
        return None;
    }
    ((1..=attacks).contains(&attack) && (1..=targets).contains(&target))
        .then(|| (attack - 1, target - 1))
}

async fn read_line() -> Option<String> {
    tokio::task::spawn_blocking(|| {
        let mut line = String::new();
        match io::stdin().lock().read_line(&mut line) {
            Ok(0) | Err(_) => None,
            Ok(_) => Some(line),
        }
    })
    .await
    .ok()
    .flatten()
}

#[async_trait]
impl ActionProvider for StdinActionProvider {
    async fn provide_intent(&self, prompt: &InputPrompt) -> Result<ActionIntent> {
        let menu = {
            let mut narrator = self.narrator.lock().await;
            narrator.flush();
            Self::menu(&narrator, prompt)
        };
        print!("{menu}");

        let request = &prompt.request;
        loop {
            print!("> ");
            let _ = io::stdout().flush();

            let line = read_line().await.ok_or_else(|| RuntimeError::ProviderFailed {
                kind: prompt.team.into(),
                reason: "stdin closed".to_string(),
            })?;

            match parse_choice(&line, request.attacks.len(), request.targets.len()) {
                Some((attack, target)) => {
                    return Ok(ActionIntent::new(
                        request.actor,
                        request.targets[target],
                        Arc::clone(&request.attacks[attack]),
                    ));
                }
                None => println!("expected `<attack> <target>`, e.g. `1 2`"),
            }
        }
    }
}
