use chrono::{Months, Utc};
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;
use uuid::Uuid;
use wealth_crm_core::{
    auth::{build_session_store, AuthService, CredentialRecord, InMemoryUserDirectory},
    config::AppConfig,
    models::{
        BasicInfo, FinancialGoal, GoalCategory, GoalStatus, OnboardingFamilyMember, Relationship,
        User, UserRole,
    },
    onboarding::OnboardingService,
    questionnaire::AnswerMap,
};

const DEMO_USERNAME: &str = "demo.rm";
const DEMO_PASSWORD: &str = "demo-password";

fn answers(pairs: &[(&str, &str)]) -> AnswerMap {
    pairs
        .iter()
        .map(|(q, o)| (q.to_string(), o.to_string()))
        .collect()
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug")),
        )
        .init();

    info!("Wealth CRM onboarding demo starting");

    let config = AppConfig::from_env()?;

    // === AUTH ===
    let directory = match &config.user_directory_path {
        Some(path) => InMemoryUserDirectory::from_json_file(path)?,
        None => InMemoryUserDirectory::new(),
    };
    let demo_rm = User {
        user_id: Uuid::new_v4(),
        username: DEMO_USERNAME.to_string(),
        email: "demo.rm@wealthdesk.example".to_string(),
        display_name: "Demo Relationship Manager".to_string(),
        role: UserRole::RelationshipManager,
    };
    if let Err(e) = directory
        .insert(CredentialRecord::new(demo_rm, DEMO_PASSWORD)?)
        .await
    {
        warn!("Demo user not added: {}", e);
    }

    let auth = AuthService::new(
        build_session_store(config.database_url.as_deref()),
        Arc::new(directory),
    );
    auth.sign_in(DEMO_USERNAME, DEMO_PASSWORD).await?;
    let rm = auth
        .authorize(&[UserRole::RelationshipManager, UserRole::Admin])
        .await?;
    info!(user = %rm.display_name, role = %rm.role, "Signed in");

    // === ONBOARDING ===
    let service = OnboardingService::in_memory();
    let family_id = Uuid::new_v4();

    let state = service
        .start(
            family_id,
            BasicInfo {
                full_name: "Asha Mehta".to_string(),
                email: "asha.mehta@example.com".to_string(),
                phone: None,
                date_of_birth: None,
                city: Some("Mumbai".to_string()),
                pan: None,
            },
        )
        .await?;
    let id = state.onboarding_id;

    let state = service
        .submit_pre_profiler(
            id,
            answers(&[
                ("pp_age_band", "age_30_45"),
                ("pp_income_source", "income_business"),
                ("pp_investable_assets", "assets_above_5cr"),
                ("pp_primary_objective", "objective_grow"),
            ]),
        )
        .await?;
    let pre_profile = state.pre_profiler_results.clone().unwrap_or_default();

    let state = service
        .submit_risk_profile(
            id,
            answers(&[
                ("rp_horizon", "horizon_5_10y"),
                ("rp_market_fall", "fall_hold"),
                ("rp_experience", "exp_funds"),
                ("rp_income_stability", "stability_high"),
                ("rp_return_expectation", "return_10_14"),
                ("rp_liquidity_need", "liquidity_little"),
                ("rp_loss_tolerance", "loss_10"),
            ]),
        )
        .await?;

    service
        .add_family_member(
            id,
            OnboardingFamilyMember {
                member_id: Uuid::new_v4(),
                name: "Kabir Mehta".to_string(),
                relationship: Relationship::Child,
                date_of_birth: None,
                is_dependent: true,
            },
        )
        .await?;
    let completed = service.complete(id).await?;

    println!("\n=== ONBOARDING RESULT ===");
    println!("Onboarding ID: {}", completed.onboarding_id);
    println!("Status: {}", completed.status);
    println!(
        "Investor type: {} (HNI: {})",
        pre_profile.investor_type().unwrap_or("unclassified"),
        pre_profile.hni_flag
    );
    if let Some(score) = &state.risk_score {
        println!(
            "Risk: {} ({} points) → equity {}% / debt {}%",
            score.category,
            score.total_score,
            score.allocation.equity_percent,
            score.allocation.debt_percent
        );
    }

    println!("\nTimeline:");
    for (i, event) in service.timeline().for_family(family_id).await?.iter().enumerate() {
        println!("  {}: {}", i + 1, serde_json::to_string(&event.kind)?);
    }

    // === GOAL REVIEW ===
    match config.goal_projector() {
        Some(projector) => {
            let today = Utc::now().date_naive();
            let mut goal = FinancialGoal {
                goal_id: Uuid::new_v4(),
                family_id,
                name: "Kabir's education".to_string(),
                category: GoalCategory::Education,
                target_amount: 5_000_000.0,
                current_amount: 1_200_000.0,
                monthly_contribution: 25_000.0,
                start_date: today - Months::new(24),
                target_date: today + Months::new(120),
                progress_percent: 0.0,
                is_achievable: false,
                projected_completion_date: None,
                status: GoalStatus::OnTrack,
                last_reviewed_at: None,
            };

            let projection = projector.review(&mut goal, today, Utc::now())?;
            println!("\n=== GOAL REVIEW ===");
            println!("Goal: {} ({})", goal.name, goal.status);
            println!("Progress: {:.1}%", projection.progress_percent);
            println!("Projected value at target: ₹{:.0}", projection.projected_value);
            if let Some(required) = projection.required_monthly_contribution {
                println!("Required monthly contribution: ₹{:.0}", required);
            }
        }
        None => {
            warn!("Goal thresholds not configured; skipping goal review");
        }
    }

    auth.sign_out().await?;
    Ok(())
}
