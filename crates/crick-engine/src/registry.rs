use std::collections::HashMap;
use std::sync::Arc;

use crick_ledger::{InMemoryBallLedger, InningsStats};
use crick_types::{InningsSlot, MatchId, PlayerId};
use tokio::sync::{watch, Mutex, RwLock};

use crate::config::MatchConfig;
use crate::error::{ScoringError, ScoringResult};
use crate::hooks::Hooks;
use crate::input::ScoringInput;
use crate::result::MatchResult;
use crate::scorer::{MatchScorer, MatchSnapshot, SubmitOutcome};
use crate::state::{MatchState, RoleField};

type MatchHandle = Arc<Mutex<MatchScorer<InMemoryBallLedger>>>;

/// Registry of live matches. Mutations on one match are serialized by
/// its own lock; different matches score independently.
#[derive(Default)]
pub struct Scoreboard {
    matches: RwLock<HashMap<MatchId, MatchHandle>>,
    hooks: Hooks,
}

impl Scoreboard {
    pub fn new(hooks: Hooks) -> Self {
        Self {
            matches: RwLock::new(HashMap::new()),
            hooks,
        }
    }

    pub async fn create_match(&self, config: MatchConfig) -> ScoringResult<MatchId> {
        let match_id = MatchId::new();
        let scorer = MatchScorer::new(
            match_id,
            config,
            InMemoryBallLedger::new(),
            self.hooks.clone(),
        )?;
        self.matches
            .write()
            .await
            .insert(match_id, Arc::new(Mutex::new(scorer)));
        Ok(match_id)
    }

    pub async fn match_ids(&self) -> Vec<MatchId> {
        let mut ids: Vec<MatchId> = self.matches.read().await.keys().copied().collect();
        ids.sort();
        ids
    }

    /// Drop a match from the registry; existing subscribers keep their
    /// last snapshot.
    pub async fn remove_match(&self, match_id: MatchId) -> ScoringResult<()> {
        self.matches
            .write()
            .await
            .remove(&match_id)
            .map(|_| ())
            .ok_or_else(|| not_found(match_id))
    }

    async fn handle(&self, match_id: MatchId) -> ScoringResult<MatchHandle> {
        self.matches
            .read()
            .await
            .get(&match_id)
            .cloned()
            .ok_or_else(|| not_found(match_id))
    }

    pub async fn submit_delivery(
        &self,
        match_id: MatchId,
        slot: InningsSlot,
        input: ScoringInput,
    ) -> ScoringResult<SubmitOutcome> {
        let handle = self.handle(match_id).await?;
        let mut scorer = handle.lock().await;
        scorer.submit(slot, &input)
    }

    pub async fn undo_last_delivery(&self, match_id: MatchId) -> ScoringResult<InningsStats> {
        let handle = self.handle(match_id).await?;
        let mut scorer = handle.lock().await;
        scorer.undo()
    }

    pub async fn assign_role(
        &self,
        match_id: MatchId,
        field: RoleField,
        player: PlayerId,
    ) -> ScoringResult<()> {
        let handle = self.handle(match_id).await?;
        let mut scorer = handle.lock().await;
        scorer.assign_role(field, player)
    }

    pub async fn start_second_innings(&self, match_id: MatchId) -> ScoringResult<()> {
        let handle = self.handle(match_id).await?;
        let mut scorer = handle.lock().await;
        scorer.start_second_innings()
    }

    pub async fn start_super_over(&self, match_id: MatchId) -> ScoringResult<()> {
        let handle = self.handle(match_id).await?;
        let mut scorer = handle.lock().await;
        scorer.start_super_over()
    }

    pub async fn finalize_match(
        &self,
        match_id: MatchId,
        player_of_match: PlayerId,
    ) -> ScoringResult<()> {
        let handle = self.handle(match_id).await?;
        let mut scorer = handle.lock().await;
        scorer.finalize(player_of_match)
    }

    pub async fn abandon_match(&self, match_id: MatchId) -> ScoringResult<()> {
        let handle = self.handle(match_id).await?;
        let mut scorer = handle.lock().await;
        scorer.abandon()
    }

    pub async fn get_result_summary(&self, match_id: MatchId) -> ScoringResult<MatchResult> {
        let handle = self.handle(match_id).await?;
        let scorer = handle.lock().await;
        Ok(scorer.result())
    }

    pub async fn innings(
        &self,
        match_id: MatchId,
        slot: InningsSlot,
    ) -> ScoringResult<InningsStats> {
        let handle = self.handle(match_id).await?;
        let scorer = handle.lock().await;
        scorer
            .innings(slot)
            .cloned()
            .ok_or_else(|| ScoringError::NotFound(format!("innings {slot} of match {match_id}")))
    }

    pub async fn state(&self, match_id: MatchId) -> ScoringResult<MatchState> {
        let handle = self.handle(match_id).await?;
        let scorer = handle.lock().await;
        Ok(scorer.state().clone())
    }

    pub async fn snapshot(&self, match_id: MatchId) -> ScoringResult<MatchSnapshot> {
        let handle = self.handle(match_id).await?;
        let scorer = handle.lock().await;
        Ok(scorer.snapshot())
    }

    /// Push-based view of one match: every committed mutation publishes
    /// a fresh snapshot.
    pub async fn subscribe(
        &self,
        match_id: MatchId,
    ) -> ScoringResult<watch::Receiver<MatchSnapshot>> {
        let handle = self.handle(match_id).await?;
        let scorer = handle.lock().await;
        Ok(scorer.subscribe())
    }
}

fn not_found(match_id: MatchId) -> ScoringError {
    ScoringError::NotFound(format!("match {match_id}"))
}

#[cfg(test)]
mod tests {
    use crick_types::{PlayingXi, Side};

    use super::*;
    use crate::config::TeamConfig;

    fn config() -> MatchConfig {
        let xi = |prefix: &str| {
            PlayingXi::new((1..=11).map(|i| PlayerId::new(format!("{prefix}{i}"))).collect())
                .unwrap()
        };
        MatchConfig::new(
            TeamConfig {
                name: "Lions".into(),
                playing_xi: xi("a"),
            },
            TeamConfig {
                name: "Tigers".into(),
                playing_xi: xi("b"),
            },
            2,
        )
    }

    #[tokio::test]
    async fn unknown_match_is_not_found() {
        let board = Scoreboard::default();
        let err = board.state(MatchId::new()).await.unwrap_err();
        assert!(err.is_not_found());
        assert!(board.undo_last_delivery(MatchId::new()).await.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn matches_score_independently() {
        let board = Scoreboard::default();
        let first = board.create_match(config()).await.unwrap();
        let second = board.create_match(config()).await.unwrap();
        assert_eq!(board.match_ids().await.len(), 2);

        for (field, player) in [
            (RoleField::Striker, "a1"),
            (RoleField::NonStriker, "a2"),
            (RoleField::Bowler, "b1"),
        ] {
            board.assign_role(first, field, player.into()).await.unwrap();
        }
        let slot = InningsSlot::main(Side::TeamA);
        board
            .submit_delivery(first, slot, ScoringInput::runs(4))
            .await
            .unwrap();

        assert_eq!(board.innings(first, slot).await.unwrap().total_runs, 4);
        assert_eq!(board.innings(second, slot).await.unwrap().total_runs, 0);
        assert!(board
            .submit_delivery(second, slot, ScoringInput::runs(1))
            .await
            .unwrap_err()
            .is_validation());

        board.remove_match(second).await.unwrap();
        assert!(board.state(second).await.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn subscribers_see_committed_deliveries() {
        let board = Scoreboard::default();
        let id = board.create_match(config()).await.unwrap();
        let mut rx = board.subscribe(id).await.unwrap();
        for (field, player) in [
            (RoleField::Striker, "a1"),
            (RoleField::NonStriker, "a2"),
            (RoleField::Bowler, "b1"),
        ] {
            board.assign_role(id, field, player.into()).await.unwrap();
        }
        board
            .submit_delivery(id, InningsSlot::main(Side::TeamA), ScoringInput::runs(6))
            .await
            .unwrap();
        rx.changed().await.unwrap();
        let snapshot = rx.borrow_and_update().clone();
        assert_eq!(snapshot.innings[0].total_runs, 6);
        assert_eq!(snapshot.state.striker, Some("a1".into()));
    }
}
