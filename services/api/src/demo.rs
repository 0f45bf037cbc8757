use crate::infra::{load_catalog, parse_card_mode, parse_date};
use card_scout::allocation::{
    compute_optimal_plan, AllocationFilter, AllocationPlan, CardTypeFilter, RewardFilter,
    MAX_CARDS_LIMIT,
};
use card_scout::catalog::{Card, CardCatalog, CardType};
use card_scout::config::AppConfig;
use card_scout::error::AppError;
use card_scout::recommend::{
    rank, FeeTolerance, Goal, Preferences, RankedResults, ScoredCard, ScoringEngine,
    SpendComfort, TravelFrequency, TravelPerk, TravelPreferences, TravelRewardsType, TravelTier,
};
use chrono::{Local, NaiveDate};
use clap::Args;
use std::path::PathBuf;

#[derive(Args, Debug, Default)]
pub(crate) struct RecommendArgs {
    /// Card catalog CSV (defaults to APP_CATALOG_PATH, then the bundled sample)
    #[arg(long)]
    pub(crate) catalog: Option<PathBuf>,
    /// Goal in priority order; repeat for secondary and tertiary goals
    #[arg(long = "goal")]
    pub(crate) goals: Vec<Goal>,
    #[arg(long)]
    pub(crate) fee_tolerance: Option<FeeTolerance>,
    #[arg(long)]
    pub(crate) spend_comfort: Option<SpendComfort>,
    /// personal or business (defaults to personal)
    #[arg(long, value_parser = parse_card_mode)]
    pub(crate) card_mode: Option<CardType>,
    #[arg(long)]
    pub(crate) travel_type: Option<TravelRewardsType>,
    #[arg(long)]
    pub(crate) travel_frequency: Option<TravelFrequency>,
    #[arg(long)]
    pub(crate) tier: Option<TravelTier>,
    #[arg(long)]
    pub(crate) bank: Option<String>,
    #[arg(long)]
    pub(crate) airline: Option<String>,
    #[arg(long)]
    pub(crate) hotel: Option<String>,
    /// tsa_ge or lounge; repeatable
    #[arg(long = "perk")]
    pub(crate) perks: Vec<TravelPerk>,
    #[arg(long)]
    pub(crate) needs_zero_apr: bool,
    #[arg(long)]
    pub(crate) exclude_travel_cards: bool,
    /// Card already held; repeatable
    #[arg(long = "owned", alias = "exclude")]
    pub(crate) owned: Vec<String>,
    /// Date a recent card was opened (YYYY-MM-DD); repeatable
    #[arg(long = "opened", value_parser = parse_date)]
    pub(crate) opened: Vec<NaiveDate>,
    /// Reference date for issuer rules (defaults to today)
    #[arg(long, value_parser = parse_date)]
    pub(crate) today: Option<NaiveDate>,
    /// Print the score breakdown under each card
    #[arg(long)]
    pub(crate) explain: bool,
}

impl RecommendArgs {
    fn preferences(&self) -> Preferences {
        let today = self.today.unwrap_or_else(|| Local::now().date_naive());
        Preferences {
            goals: self.goals.clone(),
            fee_tolerance: self.fee_tolerance,
            spend_comfort: self.spend_comfort,
            card_mode: self.card_mode,
            needs_zero_apr: self.needs_zero_apr,
            exclude_travel_cards: self.exclude_travel_cards,
            issuer_rules: Vec::new(),
            travel: TravelPreferences {
                rewards_type: self.travel_type,
                frequency: self.travel_frequency,
                preferred_bank: self.bank.clone(),
                preferred_airline: self.airline.clone(),
                preferred_hotel: self.hotel.clone(),
                tier: self.tier,
                perks: self.perks.clone(),
            },
        }
        .with_derived_rules(&self.opened, today)
    }
}

#[derive(Args, Debug)]
pub(crate) struct OptimizeArgs {
    /// Card catalog CSV (defaults to APP_CATALOG_PATH, then the bundled sample)
    #[arg(long)]
    pub(crate) catalog: Option<PathBuf>,
    /// Total dollars available for minimum spend
    #[arg(long)]
    pub(crate) budget: f64,
    /// Most cards to open (1-20, defaults to 20)
    #[arg(long)]
    pub(crate) max_cards: Option<i64>,
    /// personal, business or both
    #[arg(long, default_value = "both")]
    pub(crate) card_type: CardTypeFilter,
    /// All, General, Airline or Hotel
    #[arg(long, default_value = "All")]
    pub(crate) rewards: RewardFilter,
    /// Card already held; repeatable
    #[arg(long = "owned", alias = "exclude")]
    pub(crate) owned: Vec<String>,
}

#[derive(Args, Debug)]
pub(crate) struct DemoArgs {
    /// Card catalog CSV (defaults to APP_CATALOG_PATH, then the bundled sample)
    #[arg(long)]
    pub(crate) catalog: Option<PathBuf>,
    /// Spend budget for the allocation portion of the demo
    #[arg(long, default_value_t = 20_000.0)]
    pub(crate) budget: f64,
}

fn resolve_catalog(path: Option<PathBuf>) -> Result<CardCatalog, AppError> {
    let path = match path {
        Some(path) => Some(path),
        None => AppConfig::load()?.catalog.path,
    };
    load_catalog(path.as_deref())
}

pub(crate) fn run_recommend(args: RecommendArgs) -> Result<(), AppError> {
    let catalog = resolve_catalog(args.catalog.clone())?;
    let preferences = args.preferences();

    let results = rank(catalog.cards(), &preferences, &args.owned);
    let engine = args
        .explain
        .then(|| ScoringEngine::new(&preferences, &args.owned));
    render_recommendations(&results, &preferences, engine.as_ref());

    Ok(())
}

pub(crate) fn run_optimize(args: OptimizeArgs) -> Result<(), AppError> {
    let OptimizeArgs {
        catalog,
        budget,
        max_cards,
        card_type,
        rewards,
        owned,
    } = args;

    let catalog = resolve_catalog(catalog)?;
    let filter = AllocationFilter {
        card_type,
        rewards,
        excluded_names: owned,
    };
    let max_cards = max_cards.unwrap_or(MAX_CARDS_LIMIT as i64);
    let pool = filter.apply(catalog.cards());
    let plan = compute_optimal_plan(&pool, budget, max_cards).sorted_for_display();

    render_plan(&plan, budget, max_cards);
    Ok(())
}

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let DemoArgs { catalog, budget } = args;
    let catalog = resolve_catalog(catalog)?;

    println!("Card Scout demo ({} cards in catalog)", catalog.len());

    let traveler = demo_traveler();
    println!(
        "\nProfile: frequent traveler, goals {}, fee tolerance {}",
        goal_list(&traveler.goals),
        traveler
            .fee_tolerance
            .map_or("unspecified", FeeTolerance::label)
    );
    let results = rank(catalog.cards(), &traveler, &[]);
    let engine = ScoringEngine::new(&traveler, &[]);
    render_recommendations(&results, &traveler, Some(&engine));

    println!("\nSignup bonus plans for a ${} budget", format_usd(budget as u64));
    for max_cards in [2, 4, 6] {
        let plan = compute_optimal_plan(catalog.cards(), budget, max_cards);
        println!(
            "- up to {max_cards} cards: ${} bonus on ${} spend ({})",
            format_usd(plan.total_bonus),
            format_usd(plan.total_spend),
            plan.card_names().join(", ")
        );
    }

    let plan = compute_optimal_plan(catalog.cards(), budget, 4).sorted_for_display();
    println!();
    render_plan(&plan, budget, 4);

    Ok(())
}

fn demo_traveler() -> Preferences {
    Preferences {
        goals: vec![Goal::Travel, Goal::Bonus, Goal::Everyday],
        fee_tolerance: Some(FeeTolerance::Medium),
        spend_comfort: Some(SpendComfort::High),
        travel: TravelPreferences {
            rewards_type: Some(TravelRewardsType::General),
            frequency: Some(TravelFrequency::High),
            tier: Some(TravelTier::MidTier),
            perks: vec![TravelPerk::TsaGlobalEntry],
            ..TravelPreferences::default()
        },
        ..Preferences::default()
    }
}

pub(crate) fn render_recommendations(
    results: &RankedResults,
    preferences: &Preferences,
    engine: Option<&ScoringEngine<'_>>,
) {
    if !preferences.issuer_rules.is_empty() {
        let rules: Vec<&str> = preferences
            .issuer_rules
            .iter()
            .map(|rule| rule.label())
            .collect();
        println!("Active issuer rules: {}", rules.join(", "));
    }

    println!("\nTop {} cards", results.card_mode.label());
    render_scored_cards(&results.primary, engine);

    if let Some(other) = results.card_mode.opposite() {
        if !results.other_type.is_empty() {
            println!("\nAlso consider ({} cards)", other.label());
            render_scored_cards(&results.other_type, engine);
        }
    }
}

fn render_scored_cards(cards: &[ScoredCard], engine: Option<&ScoringEngine<'_>>) {
    if cards.is_empty() {
        println!("  (no eligible cards)");
        return;
    }

    for (position, scored) in cards.iter().enumerate() {
        let card = &scored.card;
        println!(
            "{:>2}. {} ({}) score {:.1} | {}",
            position + 1,
            card.name,
            card.issuer,
            scored.score,
            card_terms(card)
        );
        if let Some(engine) = engine {
            for component in engine.evaluate(card).components {
                println!(
                    "      {:+.1} {:?}: {}",
                    component.points, component.factor, component.notes
                );
            }
        }
    }
}

fn card_terms(card: &Card) -> String {
    let fee = if card.annual_fee == 0 {
        "no annual fee".to_string()
    } else {
        format!("${} fee", format_usd(u64::from(card.annual_fee)))
    };
    if card.bonus_value == 0 {
        return fee;
    }
    let mut terms = format!("{fee} | ${} bonus", format_usd(u64::from(card.bonus_value)));
    if card.minimum_spend > 0 && card.spend_window_months > 0 {
        terms.push_str(&format!(
            " after ${} in {} month{}",
            format_usd(u64::from(card.minimum_spend)),
            card.spend_window_months,
            if card.spend_window_months == 1 { "" } else { "s" }
        ));
    }
    terms
}

pub(crate) fn render_plan(plan: &AllocationPlan, budget: f64, max_cards: i64) {
    println!(
        "Spend plan for ${} (up to {} cards)",
        format_usd(budget.max(0.0) as u64),
        max_cards
    );
    if plan.is_empty() {
        println!("  No card bonus fits this budget.");
        return;
    }
    for entry in &plan.entries {
        println!(
            "- {} ({}): spend ${} -> ${} bonus",
            entry.card.name,
            entry.card.issuer,
            format_usd(u64::from(entry.minimum_spend)),
            format_usd(u64::from(entry.bonus))
        );
    }
    let unused = (budget.max(0.0) as u64).saturating_sub(plan.total_spend);
    println!(
        "Total: ${} bonus on ${} spend (${} unallocated)",
        format_usd(plan.total_bonus),
        format_usd(plan.total_spend),
        format_usd(unused)
    );
}

fn goal_list(goals: &[Goal]) -> String {
    if goals.is_empty() {
        return "none".to_string();
    }
    goals
        .iter()
        .map(|goal| goal.label())
        .collect::<Vec<_>>()
        .join(" > ")
}

/// Whole dollars with thousands separators.
fn format_usd(amount: u64) -> String {
    let digits = amount.to_string();
    let mut formatted = String::with_capacity(digits.len() + digits.len() / 3);
    for (index, digit) in digits.chars().enumerate() {
        if index > 0 && (digits.len() - index) % 3 == 0 {
            formatted.push(',');
        }
        formatted.push(digit);
    }
    formatted
}
