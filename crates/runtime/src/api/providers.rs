//! Asynchronous abstraction for sourcing player intent.
//!
//! AI-controlled combatants pick their own actions inside the battle rules.
//! Combatants marked for player input pause the battle until the runtime
//! obtains an [`ActionIntent`] from the [`ActionProvider`] registered for
//! their side, so battles can run with human input, scripted fixtures, or
//! external policies.
use std::sync::Mutex;

use async_trait::async_trait;
use battle_core::{ActionIntent, BattleState, InputRequest, Team};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use tokio::sync::{mpsc, oneshot};

use super::errors::{Result, RuntimeError};

/// Everything a provider needs to decide: the choices and a state snapshot.
#[derive(Clone, Debug)]
pub struct InputPrompt {
    pub team: Team,
    pub request: InputRequest,
    pub state: BattleState,
}

impl InputPrompt {
    fn failed(&self, reason: impl Into<String>) -> RuntimeError {
        RuntimeError::ProviderFailed {
            kind: self.team.into(),
            reason: reason.into(),
        }
    }
}

/// Trait for providing intents for player-controlled combatants.
///
/// Different implementations can handle:
/// - Player input (from UI/CLI)
/// - Scripted/replayed intents
/// - Testing fixtures
#[async_trait]
pub trait ActionProvider: Send + Sync {
    /// Provide an intent for `prompt.request.actor`.
    ///
    /// The returned intent is validated by the battle; a rejected intent
    /// leaves the combatant waiting and the prompt is issued again.
    async fn provide_intent(&self, prompt: &InputPrompt) -> Result<ActionIntent>;
}

/// Always uses the first attack on the first available target.
/// Useful for testing or as a fallback.
pub struct FirstAttackProvider;

#[async_trait]
impl ActionProvider for FirstAttackProvider {
    async fn provide_intent(&self, prompt: &InputPrompt) -> Result<ActionIntent> {
        let request = &prompt.request;
        let target = request
            .targets
            .first()
            .copied()
            .ok_or_else(|| prompt.failed("no target available"))?;
        let attack = request
            .attacks
            .first()
            .cloned()
            .ok_or_else(|| prompt.failed("no attack available"))?;
        Ok(ActionIntent::new(request.actor, target, attack))
    }
}

/// Picks a uniformly random attack and target.
pub struct RandomActionProvider {
    rng: Mutex<StdRng>,
}

impl RandomActionProvider {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }

    pub fn from_entropy() -> Self {
        Self {
            rng: Mutex::new(StdRng::from_entropy()),
        }
    }
}

#[async_trait]
impl ActionProvider for RandomActionProvider {
    async fn provide_intent(&self, prompt: &InputPrompt) -> Result<ActionIntent> {
        let request = &prompt.request;
        let mut rng = self
            .rng
            .lock()
            .map_err(|_| prompt.failed("random source poisoned"))?;

        let target = request
            .targets
            .choose(&mut *rng)
            .copied()
            .ok_or_else(|| prompt.failed("no target available"))?;
        let attack = request
            .attacks
            .choose(&mut *rng)
            .cloned()
            .ok_or_else(|| prompt.failed("no attack available"))?;
        Ok(ActionIntent::new(request.actor, target, attack))
    }
}

/// Reply slot handed to whoever answers a [`ChannelActionProvider`] prompt.
pub type IntentReply = oneshot::Sender<ActionIntent>;

/// Forwards prompts over a channel and waits for the answer.
///
/// Lets a UI task or a test own the decision while the runtime loop awaits it.
pub struct ChannelActionProvider {
    prompts: mpsc::Sender<(InputPrompt, IntentReply)>,
}

impl ChannelActionProvider {
    pub fn new(prompts: mpsc::Sender<(InputPrompt, IntentReply)>) -> Self {
        Self { prompts }
    }

    /// Creates a provider together with the receiving end of its prompts.
    pub fn channel(buffer: usize) -> (Self, mpsc::Receiver<(InputPrompt, IntentReply)>) {
        let (tx, rx) = mpsc::channel(buffer);
        (Self::new(tx), rx)
    }
}

#[async_trait]
impl ActionProvider for ChannelActionProvider {
    async fn provide_intent(&self, prompt: &InputPrompt) -> Result<ActionIntent> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.prompts
            .send((prompt.clone(), reply_tx))
            .await
            .map_err(|_| RuntimeError::ActionProviderChannelClosed)?;
        reply_rx
            .await
            .map_err(|_| RuntimeError::ActionProviderChannelClosed)
    }
}
