//! Turn orchestrator for self-play training.
//!
//! `GameTrainingWrapper` owns everything one self-play game needs: the table,
//! the belief matrix, the decision ledger, pending biases, the six
//! evaluators and the RNG. `take_turn` plays exactly one turn and keeps the
//! ledger consistent:
//!
//! - when a player's turn starts, every decision they made since their last
//!   turn is labelled with the best score of the new turn plus their pending
//!   bias;
//! - an eliminated player's pending decisions are labelled 0;
//! - when the game ends, the survivor's pending decisions are labelled 1.

use tracing::{debug, info, trace, warn};

use super::bias::PendingBias;
use super::ledger::{DecisionLedger, DecisionType, LedgerCheckpoint};
use super::policy::ExplorationPolicy;
use super::resolution::Contest;
use crate::belief::{update_beliefs, BeliefEvent, HandBeliefState};
use crate::core::config::DEFAULT_INITIAL_BELIEF;
use crate::core::{ActiveAction, Card, GameRng, PlayerId, TrainerConfig, CARD_TYPES, NOISE_LEN};
use crate::error::{ConfigError, EvaluatorError, TrainingError};
use crate::games::coup::CoupGame;
use crate::nn::{
    action_option, with_option, ConstantEvaluator, Evaluator, FeatureBatch, FeatureEncoder,
    TabularEvaluator, Viewpoint, DEFAULT_MAX_ENTRIES, SHARED_SLOTS,
};

/// Reward written for every pending decision of an eliminated player.
pub const ELIMINATION_REWARD: f32 = 0.0;

/// Reward written for every pending decision of the winner.
pub const VICTORY_REWARD: f32 = 1.0;

/// The six evaluators, one per decision type.
pub struct EvaluatorSet {
    evaluators: [Box<dyn Evaluator>; DecisionType::COUNT],
}

impl EvaluatorSet {
    pub fn new(
        action: Box<dyn Evaluator>,
        assassinate_block: Box<dyn Evaluator>,
        foreign_aid_block: Box<dyn Evaluator>,
        steal_block: Box<dyn Evaluator>,
        challenge: Box<dyn Evaluator>,
        hand_predictor: Box<dyn Evaluator>,
    ) -> Self {
        Self {
            evaluators: [
                action,
                assassinate_block,
                foreign_aid_block,
                steal_block,
                challenge,
                hand_predictor,
            ],
        }
    }

    /// Build each evaluator from its decision type.
    pub fn from_fn(factory: impl FnMut(DecisionType) -> Box<dyn Evaluator>) -> Self {
        Self {
            evaluators: DecisionType::ALL.map(factory),
        }
    }

    /// Constant scores everywhere: deterministic first-option play.
    pub fn constant() -> Self {
        Self::from_fn(|decision| -> Box<dyn Evaluator> {
            match decision {
                DecisionType::HandPrediction => {
                    Box::new(ConstantEvaluator::with_width(DEFAULT_INITIAL_BELIEF, CARD_TYPES))
                }
                _ => Box::new(ConstantEvaluator::default()),
            }
        })
    }

    /// Lookup tables everywhere, keyed without the noise slot.
    pub fn tabular() -> Self {
        Self::tabular_with_max_entries(DEFAULT_MAX_ENTRIES)
    }

    /// Lookup tables holding at most `max_entries` keys each.
    pub fn tabular_with_max_entries(max_entries: usize) -> Self {
        Self::from_fn(|decision| -> Box<dyn Evaluator> {
            let table = match decision {
                DecisionType::HandPrediction => {
                    TabularEvaluator::new(CARD_TYPES, DEFAULT_INITIAL_BELIEF)
                }
                _ => TabularEvaluator::new(1, 0.5).ignoring_slots(&[SHARED_SLOTS - 1]),
            };
            Box::new(table.with_max_entries(max_entries))
        })
    }

    #[must_use]
    pub fn get(&self, decision: DecisionType) -> &dyn Evaluator {
        self.evaluators[decision.index()].as_ref()
    }

    pub fn get_mut(&mut self, decision: DecisionType) -> &mut dyn Evaluator {
        self.evaluators[decision.index()].as_mut()
    }
}

impl std::fmt::Debug for EvaluatorSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EvaluatorSet").finish_non_exhaustive()
    }
}

/// Whether the game goes on after a turn.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TurnOutcome {
    Continue,
    /// At most one player is left. `winner` is `None` only if the last two
    /// players went out on the same turn.
    GameOver { winner: Option<PlayerId> },
}

/// What happened during one turn.
#[derive(Clone, Debug)]
pub struct TurnReport {
    pub actor: PlayerId,
    pub action: ActiveAction,
    /// Target of a targeting action.
    pub target: Option<PlayerId>,
    /// Evaluator score of the chosen option.
    pub expected_reward: f32,
    /// Reward written to the actor's previously pending decisions.
    pub backfilled_reward: f32,
    /// Path and result of the contest, for contestable actions.
    pub contest: Option<Contest>,
    /// Belief events sent to the hand predictor, in order.
    pub belief_events: Vec<BeliefEvent>,
    /// Players who lost their last card this turn.
    pub eliminated: Vec<PlayerId>,
    pub outcome: TurnOutcome,
}

/// State restored when a turn fails part-way.
#[derive(Debug)]
struct TurnCheckpoint {
    game: CoupGame,
    beliefs: HandBeliefState,
    bias: PendingBias,
    rng: GameRng,
    ledger: LedgerCheckpoint,
}

/// Turn orchestrator and owner of all self-play state.
#[derive(Debug)]
pub struct GameTrainingWrapper {
    pub(super) config: TrainerConfig,
    pub(super) game: CoupGame,
    pub(super) beliefs: HandBeliefState,
    pub(super) ledger: DecisionLedger,
    pub(super) bias: PendingBias,
    pub(super) evaluators: EvaluatorSet,
    pub(super) policy: ExplorationPolicy,
    pub(super) rng: GameRng,
    turns: usize,
    finished: bool,
    belief_log: Vec<BeliefEvent>,
    newly_eliminated: Vec<PlayerId>,
}

impl GameTrainingWrapper {
    /// Deal a new game under `config`.
    pub fn new(config: TrainerConfig, evaluators: EvaluatorSet) -> Result<Self, ConfigError> {
        config.validate()?;
        let rng = GameRng::new(config.seed);
        let n = config.player_count;
        Ok(Self {
            game: CoupGame::new(n, rng.for_context("deck")),
            beliefs: HandBeliefState::new(config.initial_belief),
            ledger: DecisionLedger::new(n),
            bias: PendingBias::new(n),
            policy: ExplorationPolicy::new(config.epsilon),
            evaluators,
            rng,
            config,
            turns: 0,
            finished: false,
            belief_log: Vec::new(),
            newly_eliminated: Vec::new(),
        })
    }

    /// Start a fresh game with `seed`, keeping the evaluators.
    ///
    /// Decisions still pending from the previous game are dropped.
    pub fn new_game(&mut self, seed: u64) {
        let n = self.config.player_count;
        self.config.seed = seed;
        self.rng = GameRng::new(seed);
        self.game = CoupGame::new(n, self.rng.for_context("deck"));
        self.beliefs = HandBeliefState::new(self.config.initial_belief);
        self.ledger = DecisionLedger::new(n);
        self.bias = PendingBias::new(n);
        self.turns = 0;
        self.finished = false;
    }

    #[must_use]
    pub fn config(&self) -> &TrainerConfig {
        &self.config
    }

    #[must_use]
    pub fn game(&self) -> &CoupGame {
        &self.game
    }

    /// Mutable table access, for setting up positions.
    pub fn game_mut(&mut self) -> &mut CoupGame {
        &mut self.game
    }

    #[must_use]
    pub fn beliefs(&self) -> &HandBeliefState {
        &self.beliefs
    }

    #[must_use]
    pub fn ledger(&self) -> &DecisionLedger {
        &self.ledger
    }

    /// Mutable ledger access, for routing extra samples into queues.
    pub fn ledger_mut(&mut self) -> &mut DecisionLedger {
        &mut self.ledger
    }

    #[must_use]
    pub fn bias(&self) -> &PendingBias {
        &self.bias
    }

    #[must_use]
    pub fn evaluators(&self) -> &EvaluatorSet {
        &self.evaluators
    }

    pub fn evaluators_mut(&mut self) -> &mut EvaluatorSet {
        &mut self.evaluators
    }

    /// Give back the evaluators.
    pub fn into_evaluators(self) -> EvaluatorSet {
        self.evaluators
    }

    /// Turns played in the current game.
    #[must_use]
    pub fn turns(&self) -> usize {
        self.turns
    }

    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// A fresh noise feature vector.
    pub(super) fn noise(&mut self) -> Vec<f32> {
        self.rng
            .normal_vec(self.config.noise_mean, self.config.noise_std, NOISE_LEN)
    }

    /// Send `events` through the hand predictor and log them for the report.
    pub(super) fn observe(&mut self, events: Vec<BeliefEvent>) -> Result<(), EvaluatorError> {
        update_beliefs(
            &mut self.beliefs,
            &self.game,
            self.evaluators.get_mut(DecisionType::HandPrediction),
            &events,
            &self.config.fit,
        )?;
        self.belief_log.extend(events);
        Ok(())
    }

    /// Reveal and discard `player`'s first card, shifting pending bias away
    /// from them. Returns the card, or `None` if the hand was empty.
    pub fn lose_card(&mut self, player: PlayerId) -> Option<Card> {
        let card = self.game.discard_first(player)?;
        self.bias.record_loss(player, self.config.loss_bias);
        if !self.game.is_alive(player) {
            self.newly_eliminated.push(player);
        }
        trace!(player = %player, %card, "card lost");
        Some(card)
    }

    /// Play one turn for the player whose turn it is.
    ///
    /// If any evaluator call fails, the table, beliefs, ledger, biases and
    /// RNG are put back as they were before the turn, so the call can be
    /// retried. Training already done by the hand predictor is not undone.
    pub fn take_turn(&mut self) -> Result<TurnReport, TrainingError> {
        if self.finished {
            return Err(TrainingError::GameOver);
        }
        let checkpoint = self.checkpoint();
        match self.play_turn() {
            Ok(report) => Ok(report),
            Err(err) => {
                warn!(turn = self.turns, error = %err, "turn failed, rolling back");
                self.rollback(checkpoint);
                Err(err)
            }
        }
    }

    fn checkpoint(&self) -> TurnCheckpoint {
        TurnCheckpoint {
            game: self.game.clone(),
            beliefs: self.beliefs.clone(),
            bias: self.bias.clone(),
            rng: self.rng.clone(),
            ledger: self.ledger.checkpoint(),
        }
    }

    fn rollback(&mut self, checkpoint: TurnCheckpoint) {
        self.game = checkpoint.game;
        self.beliefs = checkpoint.beliefs;
        self.bias = checkpoint.bias;
        self.rng = checkpoint.rng;
        self.ledger.rollback(&checkpoint.ledger);
        self.belief_log.clear();
        self.newly_eliminated.clear();
    }

    fn play_turn(&mut self) -> Result<TurnReport, TrainingError> {
        self.belief_log.clear();
        self.newly_eliminated.clear();

        let actor = self.game.turn;
        let opponents: Vec<PlayerId> = self
            .game
            .players_in()
            .into_iter()
            .filter(|&p| p != actor)
            .collect();
        let coins = self.game.player_coins[actor];
        let options: Vec<(ActiveAction, PlayerId)> = ActiveAction::legal_for(coins)
            .flat_map(|action| opponents.iter().map(move |&target| (action, target)))
            .collect();
        if options.is_empty() {
            return Err(TrainingError::NoLegalActions { player: actor });
        }

        let noise = self.noise();
        let base = FeatureEncoder::new(&self.game, &self.beliefs)
            .decision_state(Viewpoint::Own(actor), &noise);
        let mut candidates: Vec<_> = options
            .iter()
            .map(|&(action, target)| with_option(&base, action_option(actor, action, target)))
            .collect();

        let scores = self
            .evaluators
            .get(DecisionType::Action)
            .predict_rows(&FeatureBatch::from_samples(&candidates), 1)?;
        let choice = self.policy.choose(&scores, &mut self.rng);
        let (action, target) = options[choice];
        let best = scores.iter().copied().fold(f32::NEG_INFINITY, f32::max);

        // Label everything decided since this player's last turn.
        let backfilled_reward = best + self.bias.take(actor);
        let labelled = self.ledger.backfill_player(actor, backfilled_reward);
        self.ledger
            .queue_mut(DecisionType::Action, actor)
            .append_inputs(candidates.swap_remove(choice));

        let reported_target = action.is_targeting().then_some(target);
        debug!(
            turn = self.turns,
            actor = %actor,
            %action,
            target = ?reported_target,
            expected_reward = scores[choice],
            labelled,
            "take turn"
        );

        let acted = BeliefEvent::observed(actor, action, self.game.one_hot_hand(actor))
            .with_target(reported_target);
        self.observe(vec![acted])?;

        let contest = self.resolve(actor, action, target, &opponents)?;
        self.settle_eliminations();

        self.game.next_turn();
        self.turns += 1;

        let survivors = self.game.players_in();
        let outcome = if survivors.len() > 1 {
            TurnOutcome::Continue
        } else {
            for &player in &survivors {
                self.ledger.backfill_player(player, VICTORY_REWARD);
            }
            self.finished = true;
            let winner = survivors.first().copied();
            info!(winner = ?winner, turns = self.turns, "game over");
            TurnOutcome::GameOver { winner }
        };

        Ok(TurnReport {
            actor,
            action,
            target: reported_target,
            expected_reward: scores[choice],
            backfilled_reward,
            contest,
            belief_events: std::mem::take(&mut self.belief_log),
            eliminated: std::mem::take(&mut self.newly_eliminated),
            outcome,
        })
    }

    /// Zero out every player without cards: coins, belief row and all
    /// pending rewards.
    fn settle_eliminations(&mut self) {
        for player in PlayerId::all(self.game.num_players) {
            if self.game.is_alive(player) {
                continue;
            }
            self.ledger.backfill_player(player, ELIMINATION_REWARD);
            self.game.player_coins[player] = 0;
            self.beliefs.zero_row(player);
        }
        for player in &self.newly_eliminated {
            debug!(player = %player, "eliminated");
        }
    }

    /// Label every living player's pending decisions with `reward`.
    ///
    /// Used when a game is abandoned before it ends.
    pub fn flush_survivors(&mut self, reward: f32) -> usize {
        self.game
            .players_in()
            .into_iter()
            .map(|player| self.ledger.backfill_player(player, reward))
            .sum()
    }

    /// Fit every evaluator on its completed samples.
    ///
    /// Returns the number of samples trained per decision type. If a fit
    /// fails, that decision type's samples go back to their queues and the
    /// error is returned; decision types fit before it stay trained.
    pub fn train_all_evaluators(
        &mut self,
    ) -> Result<[usize; DecisionType::COUNT], TrainingError> {
        let mut trained = [0; DecisionType::COUNT];
        for decision in DecisionType::ALL {
            let Some(batch) = self.ledger.take_batch(decision) else {
                continue;
            };
            let fitted = self
                .evaluators
                .get_mut(decision)
                .fit(&batch.x, &batch.y, &self.config.fit);
            if let Err(err) = fitted {
                warn!(%decision, samples = batch.len(), error = %err, "fit failed, samples kept");
                self.ledger.restore_batch(decision, batch);
                return Err(err.into());
            }
            trained[decision.index()] = batch.len();
        }
        info!(?trained, "trained evaluators");
        Ok(trained)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::ActiveAction;
    use smallvec::smallvec;

    fn wrapper(players: usize) -> GameTrainingWrapper {
        let config = TrainerConfig::new(players).with_epsilon(0.0);
        GameTrainingWrapper::new(config, EvaluatorSet::constant()).unwrap()
    }

    #[test]
    fn test_rejects_bad_config() {
        let err =
            GameTrainingWrapper::new(TrainerConfig::new(7), EvaluatorSet::constant()).unwrap_err();
        assert_eq!(err, ConfigError::PlayerCount(7));

        let config = TrainerConfig::new(3).with_epsilon(1.5);
        let err = GameTrainingWrapper::new(config, EvaluatorSet::constant()).unwrap_err();
        assert_eq!(err, ConfigError::Epsilon(1.5));
    }

    #[test]
    fn test_first_turn_with_constant_scores() {
        let mut wrapper = wrapper(3);
        let report = wrapper.take_turn().unwrap();

        assert_eq!(report.actor, PlayerId::new(0));
        assert_eq!(report.action, ActiveAction::Income);
        assert_eq!(report.expected_reward, 0.5);
        assert_eq!(report.outcome, TurnOutcome::Continue);
        assert_eq!(wrapper.turns(), 1);
        assert_eq!(wrapper.game().turn, PlayerId::new(1));
        assert_eq!(wrapper.ledger().queue(DecisionType::Action, PlayerId::new(0)).pending(), 1);
    }

    #[test]
    fn test_lose_card_shifts_bias_and_tracks_elimination() {
        let mut wrapper = wrapper(2);
        let p1 = PlayerId::new(1);
        wrapper.game_mut().hands[p1] = smallvec![Card::Captain];

        assert_eq!(wrapper.lose_card(p1), Some(Card::Captain));
        assert_eq!(wrapper.lose_card(p1), None);
        assert!((wrapper.bias().get(p1) + 0.15).abs() < 1e-6);
        assert!((wrapper.bias().get(PlayerId::new(0)) - 0.15).abs() < 1e-6);
        assert_eq!(wrapper.newly_eliminated, vec![p1]);
    }

    #[test]
    fn test_new_game_resets_table_and_ledger() {
        let mut wrapper = wrapper(2);
        for _ in 0..3 {
            wrapper.take_turn().unwrap();
        }

        wrapper.new_game(99);
        assert_eq!(wrapper.turns(), 0);
        assert_eq!(wrapper.config().seed, 99);
        assert_eq!(wrapper.ledger().num_inputs(DecisionType::Action), 0);
        assert_eq!(wrapper.game().player_coins[PlayerId::new(0)], 2);
        assert_eq!(wrapper.beliefs(), &HandBeliefState::new(DEFAULT_INITIAL_BELIEF));
        assert!(!wrapper.is_finished());
    }
}
