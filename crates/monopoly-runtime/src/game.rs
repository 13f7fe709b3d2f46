//! The game orchestrator: turn rotation, movement and cell actions.

use crate::event::GameEvent;
use crate::prompt::Prompter;
use crate::stats::GameStats;
use monopoly_config::GameConfig;
use monopoly_core::{
    Archetype, Avatar, Board, BuildingKind, CardEffect, CellKind, CommandError, Deck, DeckKind,
    Dice, FatalError, GameResult, GameRules, Money, Owner, Player, PlayerId, PlayerStats, Step,
};
use monopoly_econ::{
    self as econ, ChargeMode, Ledger, Payment, TradeBook, TradeKind, Valuation,
};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tracing::{debug, info};

/// What landing on a cell asks for.
enum Action {
    Nothing,
    ToJail,
    Parking,
    Tax(Option<Money>),
    Draw(DeckKind),
    Rent,
}

pub struct Game {
    board: Board,
    ledger: Ledger,
    chance: Deck,
    community: Deck,
    trades: TradeBook,
    rules: GameRules,
    valuation: Valuation,
    rng: ChaCha8Rng,
    /// Active players in turn order.
    order: Vec<PlayerId>,
    turn: usize,
    started: bool,
    winner: Option<PlayerId>,
    inflations: u32,
}

impl Game {
    /// Prices the board and seeds the dice from the rules.
    pub fn new(config: GameConfig) -> GameResult<Self> {
        let GameConfig {
            mut board,
            decks,
            rules,
        } = config;
        rules.validate().map_err(FatalError::from)?;
        let valuation = econ::price_board(&mut board, rules.first_solar_price)?;
        info!(?valuation, seed = rules.rng_seed, "new game");
        Ok(Self {
            board,
            ledger: Ledger::new(),
            chance: decks.chance,
            community: decks.community,
            trades: TradeBook::new(),
            rng: ChaCha8Rng::seed_from_u64(rules.rng_seed),
            rules,
            valuation,
            order: Vec::new(),
            turn: 0,
            started: false,
            winner: None,
            inflations: 0,
        })
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    pub fn trades(&self) -> &TradeBook {
        &self.trades
    }

    pub fn rules(&self) -> &GameRules {
        &self.rules
    }

    pub fn valuation(&self) -> Valuation {
        self.valuation
    }

    pub fn is_started(&self) -> bool {
        self.started
    }

    pub fn winner(&self) -> Option<&Player> {
        self.winner.and_then(|id| self.ledger.player(id).ok())
    }

    pub fn inflations(&self) -> u32 {
        self.inflations
    }

    /// Active players in turn order.
    pub fn players(&self) -> impl Iterator<Item = &Player> + '_ {
        self.order.iter().filter_map(|&id| self.ledger.player(id).ok())
    }

    fn name(&self, id: PlayerId) -> String {
        self.ledger.owner_name(Owner::Player(id))
    }

    /// The player whose turn it is.
    pub fn current(&self) -> GameResult<&Player> {
        let id = self.playing()?;
        Ok(self.ledger.player(id)?)
    }

    pub fn player_stats(&self, name: &str) -> GameResult<&PlayerStats> {
        let id = self
            .ledger
            .find(name)
            .ok_or_else(|| CommandError::UnknownPlayer(name.to_string()))?;
        Ok(&self.ledger.player(id)?.stats)
    }

    pub fn stats(&self) -> GameStats {
        GameStats::collect(&self.board, &self.ledger)
    }

    fn playing(&self) -> GameResult<PlayerId> {
        if !self.started {
            return Err(CommandError::NotStarted.into());
        }
        if self.winner.is_some() {
            return Err(CommandError::GameOver.into());
        }
        Ok(self
            .order
            .get(self.turn)
            .copied()
            .ok_or(FatalError::Invariant("turn points past the rotation".into()))?)
    }

    fn require_solvent(&self, id: PlayerId) -> GameResult<()> {
        let player = self.ledger.player(id)?;
        if player.is_indebted() {
            return Err(CommandError::Indebted(player.name.clone()).into());
        }
        Ok(())
    }

    pub fn add_player(&mut self, name: &str, archetype: &str) -> GameResult<Vec<GameEvent>> {
        if self.started {
            return Err(CommandError::AlreadyStarted.into());
        }
        let name = name.trim();
        if name.is_empty() || name.contains(char::is_whitespace) {
            return Err(CommandError::InvalidName(name.to_string()).into());
        }
        let archetype = Archetype::parse(archetype)?;
        let max = self.rules.max_players;
        if self.order.len() >= max {
            return Err(CommandError::TooManyPlayers(max).into());
        }
        if self.ledger.find(name).is_some() {
            return Err(CommandError::DuplicatePlayer(name.to_string()).into());
        }
        let letter = ('A'..='Z')
            .find(|c| self.ledger.players().iter().all(|p| p.avatar.id != *c))
            .ok_or(CommandError::TooManyPlayers(max))?;
        let go = self.board.go_position();
        let id = self.ledger.add_player(name, Avatar::new(letter, archetype, go));
        self.ledger.credit(id, self.valuation.initial_balance)?;
        self.board.place(id, go)?;
        self.order.push(id);
        info!(player = name, avatar = %letter, %archetype, "player joined");
        Ok(vec![GameEvent::PlayerJoined {
            player: name.to_string(),
            avatar: letter,
            archetype: archetype.to_string(),
        }])
    }

    pub fn start(&mut self) -> GameResult<Vec<GameEvent>> {
        if self.started {
            return Err(CommandError::AlreadyStarted.into());
        }
        if self.order.len() < self.rules.min_players {
            return Err(CommandError::NotEnoughPlayers(self.rules.min_players).into());
        }
        self.started = true;
        let first = self.name(self.playing()?);
        info!(players = self.order.len(), "game started");
        Ok(vec![GameEvent::Started { first }])
    }

    /// Throws the dice, or uses `dice` when given, and plays the outcome.
    pub fn roll(&mut self, dice: Option<Dice>, prompter: &mut dyn Prompter) -> GameResult<Vec<GameEvent>> {
        let id = self.playing()?;
        self.require_solvent(id)?;
        self.ledger.player(id)?.avatar.check_roll()?;
        let dice = dice.unwrap_or_else(|| Dice::roll(&mut self.rng));
        let player = self.ledger.player_mut(id)?;
        let step = player.avatar.advance(Some(dice))?;
        player.stats.throws += 1;
        let mut events = vec![GameEvent::Rolled {
            player: player.name.clone(),
            dice,
        }];
        self.apply_step(id, step, prompter, &mut events)?;
        Ok(events)
    }

    /// Continues a movement split over several throws.
    pub fn continue_move(&mut self, prompter: &mut dyn Prompter) -> GameResult<Vec<GameEvent>> {
        let id = self.playing()?;
        self.require_solvent(id)?;
        let step = self.ledger.player_mut(id)?.avatar.advance(None)?;
        let mut events = Vec::new();
        self.apply_step(id, step, prompter, &mut events)?;
        Ok(events)
    }

    fn apply_step(
        &mut self,
        id: PlayerId,
        step: Step,
        prompter: &mut dyn Prompter,
        events: &mut Vec<GameEvent>,
    ) -> GameResult<()> {
        let player = self.name(id);
        match step {
            Step::StillJailed(_) => events.push(GameEvent::StillJailed { player }),
            Step::Released(_) => events.push(GameEvent::ReleasedFromJail { player }),
            Step::BailDue(_) => {
                let bail = self.board.bail()?;
                let payment = self.ledger.pay_to_pot(id, bail)?;
                events.push(GameEvent::BailPaid {
                    player,
                    amount: bail,
                    forced: true,
                });
                self.note_debt(id, payment, events)?;
            }
            Step::SentToJail(_) => self.jail(id, events)?,
            Step::Move { from, target, dice } => {
                self.move_avatar(id, from, target, dice, prompter, events)?
            }
        }
        Ok(())
    }

    fn note_debt(&self, id: PlayerId, payment: Payment, events: &mut Vec<GameEvent>) -> GameResult<()> {
        if payment == Payment::Indebted {
            let player = self.ledger.player(id)?;
            events.push(GameEvent::InDebt {
                player: player.name.clone(),
                balance: player.balance,
                creditor: self.ledger.owner_name(player.creditor.unwrap_or(Owner::Bank)),
            });
        }
        Ok(())
    }

    /// Moves an avatar to the Jail cell without passing Go.
    fn jail(&mut self, id: PlayerId, events: &mut Vec<GameEvent>) -> GameResult<()> {
        let jail = self.board.jail_position();
        let player = self.ledger.player_mut(id)?;
        let from = player.avatar.position();
        player.avatar.imprison();
        player.avatar.land(jail);
        player.stats.jail_visits += 1;
        let name = player.name.clone();
        self.board.relocate(id, from, jail)?;
        info!(player = %name, "sent to jail");
        events.push(GameEvent::Jailed { player: name });
        Ok(())
    }

    fn move_avatar(
        &mut self,
        id: PlayerId,
        from: usize,
        target: i64,
        dice: Dice,
        prompter: &mut dyn Prompter,
        events: &mut Vec<GameEvent>,
    ) -> GameResult<()> {
        let size = self.board.len() as i64;
        let bonus = self.board.go_bonus()?;
        let name = self.name(id);
        if target >= size {
            self.ledger.credit(id, bonus)?;
            let stats = &mut self.ledger.player_mut(id)?.stats;
            stats.laps += 1;
            stats.go_bonuses += bonus;
            events.push(GameEvent::PassedGo {
                player: name.clone(),
                bonus,
            });
            self.check_inflation(events)?;
        } else if target < 0 {
            let stats = &mut self.ledger.player_mut(id)?.stats;
            if stats.laps > 0 {
                stats.laps -= 1;
                let payment = self.ledger.pay_to_pot(id, bonus)?;
                events.push(GameEvent::BackPastGo {
                    player: name.clone(),
                    charge: bonus,
                });
                self.note_debt(id, payment, events)?;
            }
        }
        let to = self.board.wrap(target);
        self.board.relocate(id, from, to)?;
        self.ledger.player_mut(id)?.avatar.land(to);
        let cell = self.board.cell(to)?.name.clone();
        debug!(player = %name, from, to, "moved");
        events.push(GameEvent::Moved {
            player: name,
            cell,
            position: to,
        });
        self.cell_action(id, to, dice, prompter, events)
    }

    fn cell_action(
        &mut self,
        id: PlayerId,
        position: usize,
        dice: Dice,
        prompter: &mut dyn Prompter,
        events: &mut Vec<GameEvent>,
    ) -> GameResult<()> {
        let action = match &self.board.cell(position)?.kind {
            CellKind::Go | CellKind::Jail => Action::Nothing,
            CellKind::GoToJail => Action::ToJail,
            CellKind::Parking => Action::Parking,
            CellKind::Tax { amount } => Action::Tax(*amount),
            CellKind::Chance => Action::Draw(DeckKind::Chance),
            CellKind::Community => Action::Draw(DeckKind::Community),
            CellKind::Property(_) => Action::Rent,
        };
        let player = self.name(id);
        match action {
            Action::Nothing => {}
            Action::ToJail => self.jail(id, events)?,
            Action::Parking => {
                let amount = self.ledger.take_pot();
                if amount > 0 {
                    self.ledger.credit(id, amount)?;
                    self.ledger.player_mut(id)?.stats.prizes += amount;
                    events.push(GameEvent::PotCollected { player, amount });
                }
            }
            Action::Tax(amount) => {
                let amount = amount.ok_or(FatalError::Unset("tax amount"))?;
                let payment = self.ledger.pay_to_pot(id, amount)?;
                self.ledger.player_mut(id)?.stats.taxes += amount;
                events.push(GameEvent::TaxPaid { player, amount });
                self.note_debt(id, payment, events)?;
            }
            Action::Draw(deck) => self.draw_card(id, deck, prompter, events)?,
            Action::Rent => self.collect_rent(id, position, dice, events)?,
        }
        Ok(())
    }

    fn collect_rent(
        &mut self,
        id: PlayerId,
        position: usize,
        dice: Dice,
        events: &mut Vec<GameEvent>,
    ) -> GameResult<()> {
        let Some(property) = self.board.property(position) else {
            return Ok(());
        };
        let Owner::Player(owner) = property.owner else {
            return Ok(());
        };
        if owner == id || property.mortgaged {
            return Ok(());
        }
        let property_name = property.name.clone();
        if self.trades.waives_rent(id, owner, position) {
            events.push(GameEvent::RentWaived {
                payer: self.name(id),
                property: property_name,
            });
            return Ok(());
        }
        let amount = econ::rent(&self.board, position, dice)?;
        if amount <= 0 {
            return Ok(());
        }
        let payment = self.ledger.pay_rent(id, owner, amount)?;
        if let Some(p) = self.board.property_mut(position) {
            p.rent_collected += amount;
        }
        events.push(GameEvent::RentPaid {
            payer: self.name(id),
            owner: self.name(owner),
            property: property_name,
            amount,
        });
        self.note_debt(id, payment, events)
    }

    fn draw_card(
        &mut self,
        id: PlayerId,
        kind: DeckKind,
        prompter: &mut dyn Prompter,
        events: &mut Vec<GameEvent>,
    ) -> GameResult<()> {
        let player = self.name(id);
        let deck = match kind {
            DeckKind::Chance => &mut self.chance,
            DeckKind::Community => &mut self.community,
        };
        deck.shuffle(&mut self.rng);
        let index = prompter.choose_card(&player, kind, deck.len());
        let card = deck.pick(index).cloned().ok_or_else(|| {
            FatalError::Invariant(format!("card {index} picked from a deck of {}", deck.len()))
        })?;
        debug!(player = %player, deck = %kind, id = card.id, "card drawn");
        events.push(GameEvent::CardDrawn {
            player,
            deck: kind,
            description: card.description,
        });
        self.apply_card(id, card.effect, events)
    }

    fn apply_card(&mut self, id: PlayerId, effect: CardEffect, events: &mut Vec<GameEvent>) -> GameResult<()> {
        let player = self.name(id);
        let others: Vec<PlayerId> = self.order.iter().copied().filter(|&o| o != id).collect();
        match effect {
            CardEffect::Credit(amount) => {
                self.ledger.credit(id, amount)?;
                self.ledger.player_mut(id)?.stats.prizes += amount;
                events.push(GameEvent::Credited { player, amount });
            }
            CardEffect::Charge(amount) => self.charge_card(id, amount, events)?,
            CardEffect::BuildingLevy => {
                let amount: Money = self
                    .board
                    .owned_by(Owner::Player(id))
                    .into_iter()
                    .filter_map(|pos| self.board.property(pos))
                    .flat_map(|p| {
                        BuildingKind::ALL
                            .into_iter()
                            .map(move |k| p.count_buildings(k) as Money * CardEffect::levy(k))
                    })
                    .sum();
                if amount > 0 {
                    self.charge_card(id, amount, events)?;
                }
            }
            CardEffect::PayEachPlayer(amount) => {
                for other in others {
                    let mode = ChargeMode::Mandatory {
                        creditor: Owner::Player(other),
                    };
                    let payment = self.ledger.transfer(id, other, amount, mode)?;
                    events.push(GameEvent::Paid {
                        from: player.clone(),
                        to: self.name(other),
                        amount,
                    });
                    self.note_debt(id, payment, events)?;
                }
            }
            CardEffect::CollectFromEachPlayer(amount) => {
                for other in others {
                    let mode = ChargeMode::Mandatory {
                        creditor: Owner::Player(id),
                    };
                    let payment = self.ledger.transfer(other, id, amount, mode)?;
                    events.push(GameEvent::Paid {
                        from: self.name(other),
                        to: player.clone(),
                        amount,
                    });
                    self.note_debt(other, payment, events)?;
                }
            }
        }
        Ok(())
    }

    fn charge_card(&mut self, id: PlayerId, amount: Money, events: &mut Vec<GameEvent>) -> GameResult<()> {
        let payment = self.ledger.pay_to_pot(id, amount)?;
        self.ledger.player_mut(id)?.stats.taxes += amount;
        events.push(GameEvent::Charged {
            player: self.name(id),
            amount,
        });
        self.note_debt(id, payment, events)
    }

    /// Every active player completed enough laps since the last event:
    /// unsold solars get more expensive.
    fn check_inflation(&mut self, events: &mut Vec<GameEvent>) -> GameResult<()> {
        let threshold = self.rules.inflation_laps * (self.inflations + 1);
        let due = self.players().all(|p| p.stats.laps >= threshold);
        if !due {
            return Ok(());
        }
        let repriced = econ::inflate_unsold(&mut self.board, self.rules.inflation_pct)?;
        self.inflations += 1;
        info!(round = self.inflations, repriced, "inflation");
        events.push(GameEvent::Inflation {
            round: self.inflations,
            repriced,
        });
        Ok(())
    }

    pub fn end_turn(&mut self) -> GameResult<Vec<GameEvent>> {
        let id = self.playing()?;
        self.require_solvent(id)?;
        self.ledger.player_mut(id)?.avatar.end_turn()?;
        self.trades.end_turn(id);
        self.turn = (self.turn + 1) % self.order.len();
        let next = self.name(self.playing()?);
        Ok(vec![GameEvent::TurnEnded {
            player: self.name(id),
            next,
        }])
    }

    /// Leaves jail by paying the bail.
    pub fn pay_bail(&mut self) -> GameResult<Vec<GameEvent>> {
        let id = self.playing()?;
        self.ledger.player(id)?.avatar.check_bail()?;
        let bail = self.board.bail()?;
        self.ledger.charge(id, bail, ChargeMode::Voluntary)?;
        self.ledger.add_to_pot(bail);
        self.ledger.player_mut(id)?.avatar.release_on_bail()?;
        Ok(vec![GameEvent::BailPaid {
            player: self.name(id),
            amount: bail,
            forced: false,
        }])
    }

    pub fn toggle_mode(&mut self) -> GameResult<Vec<GameEvent>> {
        let id = self.playing()?;
        let special = self.ledger.player_mut(id)?.avatar.toggle_mode()?;
        Ok(vec![GameEvent::ModeChanged {
            player: self.name(id),
            special,
        }])
    }

    pub fn buy(&mut self) -> GameResult<Vec<GameEvent>> {
        let id = self.playing()?;
        let price = econ::buy(&mut self.board, &mut self.ledger, id)?;
        let position = self.ledger.player(id)?.avatar.position();
        Ok(vec![GameEvent::Bought {
            player: self.name(id),
            property: self.board.cell(position)?.name.clone(),
            price,
        }])
    }

    pub fn build(&mut self, kind: BuildingKind, count: usize) -> GameResult<Vec<GameEvent>> {
        let id = self.playing()?;
        let cost = econ::build(&mut self.board, &mut self.ledger, id, kind, count)?;
        let position = self.ledger.player(id)?.avatar.position();
        Ok(vec![GameEvent::Built {
            player: self.name(id),
            property: self.board.cell(position)?.name.clone(),
            kind,
            count,
            cost,
        }])
    }

    pub fn sell(&mut self, kind: BuildingKind, property: &str, count: usize) -> GameResult<Vec<GameEvent>> {
        let id = self.playing()?;
        let position = econ::locate(&self.board, property)?;
        let refund = econ::sell(&mut self.board, &mut self.ledger, id, position, kind, count)?;
        Ok(vec![GameEvent::Sold {
            player: self.name(id),
            property: self.board.cell(position)?.name.clone(),
            kind,
            count,
            refund,
        }])
    }

    pub fn mortgage(&mut self, property: &str) -> GameResult<Vec<GameEvent>> {
        let id = self.playing()?;
        let position = econ::locate(&self.board, property)?;
        let value = econ::mortgage(&mut self.board, &mut self.ledger, id, position)?;
        Ok(vec![GameEvent::Mortgaged {
            player: self.name(id),
            property: self.board.cell(position)?.name.clone(),
            value,
        }])
    }

    pub fn unmortgage(&mut self, property: &str) -> GameResult<Vec<GameEvent>> {
        let id = self.playing()?;
        let position = econ::locate(&self.board, property)?;
        let cost = econ::unmortgage(&mut self.board, &mut self.ledger, id, position)?;
        Ok(vec![GameEvent::Unmortgaged {
            player: self.name(id),
            property: self.board.cell(position)?.name.clone(),
            cost,
        }])
    }

    /// Offers a trade from the current player to `target`.
    pub fn propose_trade(&mut self, target: &str, kind: TradeKind) -> GameResult<Vec<GameEvent>> {
        let id = self.playing()?;
        let target_id = self
            .ledger
            .find(target)
            .ok_or_else(|| CommandError::UnknownPlayer(target.to_string()))?;
        let trade = self
            .trades
            .propose(&self.board, &self.ledger, id, target_id, kind)?
            .id
            .clone();
        Ok(vec![GameEvent::TradeProposed {
            id: trade,
            proposer: self.name(id),
            target: self.name(target_id),
        }])
    }

    pub fn accept_trade(&mut self, trade: &str) -> GameResult<Vec<GameEvent>> {
        let id = self.playing()?;
        self.trades
            .accept(&mut self.board, &mut self.ledger, trade, id)?;
        Ok(vec![GameEvent::TradeAccepted {
            id: self.trades.get(trade)?.id.clone(),
        }])
    }

    pub fn withdraw_trade(&mut self, trade: &str) -> GameResult<Vec<GameEvent>> {
        let id = self.playing()?;
        self.trades.withdraw(trade, id)?;
        Ok(vec![GameEvent::TradeWithdrawn {
            id: self.trades.get(trade)?.id.clone(),
        }])
    }

    /// The current player leaves the game. Its estate goes to its creditor,
    /// or to the Bank.
    pub fn declare_bankruptcy(&mut self) -> GameResult<Vec<GameEvent>> {
        let id = self.playing()?;
        let heir = econ::liquidate(&mut self.board, &mut self.ledger, id)?;
        self.trades.withdraw_involving(id);
        self.order.retain(|&p| p != id);
        if self.turn >= self.order.len() {
            self.turn = 0;
        }
        let mut events = vec![GameEvent::Bankrupt {
            player: self.name(id),
            heir: self.ledger.owner_name(heir),
        }];
        match self.order.as_slice() {
            [last] => {
                self.winner = Some(*last);
                let player = self.name(*last);
                info!(player = %player, "game over");
                events.push(GameEvent::Winner { player });
            }
            [] => return Err(FatalError::Invariant("no player left".into()).into()),
            _ => {}
        }
        Ok(events)
    }

    /// Plays the current turn with random dice: rolls (or continues a hop)
    /// while throws remain, goes bankrupt if left in debt, then ends the
    /// turn. Buys nothing.
    pub fn play_turn(&mut self, prompter: &mut dyn Prompter) -> GameResult<Vec<GameEvent>> {
        let id = self.playing()?;
        let mut events = Vec::new();
        loop {
            let player = self.ledger.player(id)?;
            if player.is_indebted() {
                events.extend(self.declare_bankruptcy()?);
                return Ok(events);
            }
            let avatar = &player.avatar;
            if avatar.throws_remaining() == 0 || avatar.cooldown() > 0 {
                break;
            }
            let more = if avatar.pending().is_some() {
                self.continue_move(prompter)?
            } else {
                self.roll(None, prompter)?
            };
            events.extend(more);
        }
        events.extend(self.end_turn()?);
        Ok(events)
    }
}
