//! Text commands typed at the prompt.

use anyhow::{anyhow, bail, Result};
use monopoly_core::{Board, BuildingKind, CommandError, Dice, Money};
use monopoly_econ::{locate, TradeKind};

/// A trade offer with properties still named as typed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Offer {
    PropertyForProperty { give: String, take: String },
    PropertyForCash { give: String, cash: Money },
    CashForProperty { cash: Money, take: String },
    PropertyForPropertyAndCash { give: String, take: String, cash: Money },
    PropertyAndCashForProperty { give: String, cash: Money, take: String },
    Waiver { give: String, take: String, waived: String, turns: u32 },
}

impl Offer {
    /// Resolves property names to board positions.
    pub fn resolve(&self, board: &Board) -> Result<TradeKind, CommandError> {
        let at = |name: &str| locate(board, name);
        let kind = match self {
            Offer::PropertyForProperty { give, take } => TradeKind::PropertyForProperty {
                give: at(give)?,
                take: at(take)?,
            },
            Offer::PropertyForCash { give, cash } => TradeKind::PropertyForCash {
                give: at(give)?,
                cash: *cash,
            },
            Offer::CashForProperty { cash, take } => TradeKind::CashForProperty {
                cash: *cash,
                take: at(take)?,
            },
            Offer::PropertyForPropertyAndCash { give, take, cash } => {
                TradeKind::PropertyForPropertyAndCash {
                    give: at(give)?,
                    take: at(take)?,
                    cash: *cash,
                }
            }
            Offer::PropertyAndCashForProperty { give, cash, take } => {
                TradeKind::PropertyAndCashForProperty {
                    give: at(give)?,
                    cash: *cash,
                    take: at(take)?,
                }
            }
            Offer::Waiver { give, take, waived, turns } => {
                TradeKind::PropertyForPropertyWithRentWaiver {
                    give: at(give)?,
                    take: at(take)?,
                    waived: at(waived)?,
                    turns: *turns,
                }
            }
        };
        Ok(kind)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Command {
    Create { name: String, archetype: String },
    Start,
    Roll(Option<Dice>),
    Next,
    End,
    Bail,
    Mode,
    Buy,
    Build { kind: BuildingKind, count: usize },
    Sell { kind: BuildingKind, property: String, count: usize },
    Mortgage(String),
    Unmortgage(String),
    Trade { target: String, offer: Offer },
    Accept(String),
    Withdraw(String),
    Trades,
    Bankrupt,
    Player,
    Stats(Option<String>),
    Help,
    Quit,
}

pub const HELP: &str = "\
create <name> <car|ball|sphinx|hat>   add a player before the start
start                                 begin the game
roll [a b]                            throw the dice, or use fixed values
next                                  continue a split movement
end                                   end the turn
bail                                  pay to leave jail
mode                                  toggle basic/special movement
buy                                   buy the property you stand on
build <kind> [n]                      house, hotel, pool or court
sell <kind> <property> <n>            sell buildings for half their price
mortgage <property> | unmortgage <property>
trade <player> pp <give> <take>
trade <player> pc <give> <cash>
trade <player> cp <cash> <take>
trade <player> ppc <give> <take> <cash>
trade <player> pcp <give> <cash> <take>
trade <player> waiver <give> <take> <waived> <turns>
accept <id> | withdraw <id> | trades  manage trade offers
bankrupt                              leave the game
player                                show the current player
stats [name]                          game or player statistics
quit
Names with spaces go in double quotes.";

/// Splits a line on whitespace, keeping double-quoted runs together.
pub fn tokenize(line: &str) -> Result<Vec<String>> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut quoted = false;
    let mut started = false;
    for c in line.chars() {
        match c {
            '"' => {
                quoted = !quoted;
                started = true;
            }
            c if c.is_whitespace() && !quoted => {
                if started {
                    tokens.push(std::mem::take(&mut current));
                    started = false;
                }
            }
            c => {
                current.push(c);
                started = true;
            }
        }
    }
    if quoted {
        bail!("unterminated quote");
    }
    if started {
        tokens.push(current);
    }
    Ok(tokens)
}

fn number<T: std::str::FromStr>(token: &str, what: &str) -> Result<T> {
    token
        .parse()
        .map_err(|_| anyhow!("`{token}` is not a valid {what}"))
}

fn building(token: &str) -> Result<BuildingKind> {
    BuildingKind::parse(token).ok_or_else(|| anyhow!("unknown building `{token}`"))
}

fn offer(form: &str, args: &[String]) -> Result<Offer> {
    let cash = |t: &String| number::<Money>(t, "amount");
    let offer = match (form, args) {
        ("pp", [give, take]) => Offer::PropertyForProperty {
            give: give.clone(),
            take: take.clone(),
        },
        ("pc", [give, c]) => Offer::PropertyForCash {
            give: give.clone(),
            cash: cash(c)?,
        },
        ("cp", [c, take]) => Offer::CashForProperty {
            cash: cash(c)?,
            take: take.clone(),
        },
        ("ppc", [give, take, c]) => Offer::PropertyForPropertyAndCash {
            give: give.clone(),
            take: take.clone(),
            cash: cash(c)?,
        },
        ("pcp", [give, c, take]) => Offer::PropertyAndCashForProperty {
            give: give.clone(),
            cash: cash(c)?,
            take: take.clone(),
        },
        ("waiver", [give, take, waived, turns]) => Offer::Waiver {
            give: give.clone(),
            take: take.clone(),
            waived: waived.clone(),
            turns: number(turns, "turn count")?,
        },
        _ => bail!("usage: see `help` for the trade forms"),
    };
    Ok(offer)
}

/// Parses one input line. Blank lines yield `None`.
pub fn parse(line: &str) -> Result<Option<Command>> {
    let tokens = tokenize(line)?;
    let Some((head, args)) = tokens.split_first() else {
        return Ok(None);
    };
    let command = match (head.to_ascii_lowercase().as_str(), args) {
        ("create", [name, archetype]) => Command::Create {
            name: name.clone(),
            archetype: archetype.clone(),
        },
        ("start", []) => Command::Start,
        ("roll", []) => Command::Roll(None),
        ("roll", [a, b]) => {
            let dice = Dice::new(number(a, "die")?, number(b, "die")?)
                .ok_or_else(|| anyhow!("dice values go from 1 to 6"))?;
            Command::Roll(Some(dice))
        }
        ("next", []) => Command::Next,
        ("end", []) => Command::End,
        ("bail", []) => Command::Bail,
        ("mode", []) => Command::Mode,
        ("buy", []) => Command::Buy,
        ("build", [kind]) => Command::Build {
            kind: building(kind)?,
            count: 1,
        },
        ("build", [kind, n]) => Command::Build {
            kind: building(kind)?,
            count: number(n, "count")?,
        },
        ("sell", [kind, property, n]) => Command::Sell {
            kind: building(kind)?,
            property: property.clone(),
            count: number(n, "count")?,
        },
        ("mortgage", [p]) => Command::Mortgage(p.clone()),
        ("unmortgage", [p]) => Command::Unmortgage(p.clone()),
        ("trade", [target, form, rest @ ..]) => Command::Trade {
            target: target.clone(),
            offer: offer(&form.to_ascii_lowercase(), rest)?,
        },
        ("accept", [id]) => Command::Accept(id.clone()),
        ("withdraw", [id]) => Command::Withdraw(id.clone()),
        ("trades", []) => Command::Trades,
        ("bankrupt", []) => Command::Bankrupt,
        ("player", []) => Command::Player,
        ("stats", []) => Command::Stats(None),
        ("stats", [name]) => Command::Stats(Some(name.clone())),
        ("help", _) => Command::Help,
        ("quit" | "exit", _) => Command::Quit,
        (other, _) => bail!("cannot understand `{other}`; type `help`"),
    };
    Ok(Some(command))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quotes_group_words() {
        assert_eq!(
            tokenize(r#"mortgage "Mill Lane""#).unwrap(),
            vec!["mortgage", "Mill Lane"]
        );
        assert_eq!(tokenize("  roll   ").unwrap(), vec!["roll"]);
        assert_eq!(tokenize(r#"x """#).unwrap(), vec!["x", ""]);
        assert!(tokenize(r#"buy "open"#).is_err());
    }

    #[test]
    fn parses_everyday_commands() {
        assert_eq!(parse("").unwrap(), None);
        assert_eq!(parse("ROLL").unwrap(), Some(Command::Roll(None)));
        assert_eq!(
            parse("roll 3 3").unwrap(),
            Some(Command::Roll(Dice::new(3, 3)))
        );
        assert!(parse("roll 0 7").is_err());
        assert_eq!(
            parse("build hotel").unwrap(),
            Some(Command::Build { kind: BuildingKind::Hotel, count: 1 })
        );
        assert_eq!(
            parse(r#"sell house "Mill Lane" 2"#).unwrap(),
            Some(Command::Sell {
                kind: BuildingKind::House,
                property: "Mill Lane".into(),
                count: 2
            })
        );
        assert!(parse("dance").is_err());
    }

    #[test]
    fn parses_trade_forms() {
        let cmd = parse(r#"trade bob pcp "Mill Lane" 50000 "Pier Street""#).unwrap();
        assert_eq!(
            cmd,
            Some(Command::Trade {
                target: "bob".into(),
                offer: Offer::PropertyAndCashForProperty {
                    give: "Mill Lane".into(),
                    cash: 50_000,
                    take: "Pier Street".into(),
                },
            })
        );
        assert!(parse("trade bob pc Mill").is_err());
        assert!(parse("trade bob waiver a b c many").is_err());
    }
}
