use std::path::{Path, PathBuf};

use anyhow::{anyhow, bail, Context, Result};
use clap::{Parser, Subcommand};

use vidasync::auth::ProfileUpdate;
use vidasync::calendar::{self, WEEKDAYS};
use vidasync::foods::{parse_foods_to_ingredients, Dish, Ingredient, MealDraft};
use vidasync::images::source::file_uri;
use vidasync::images::{load_image_file, ImageSource};
use vidasync::meals::{self, Meal, MealType, NewMeal};
use vidasync::nutrition::{get_nutrition, MacroTotals, NutritionData};
use vidasync::AppState;

#[derive(Parser)]
#[command(name = "vidasync")]
#[command(about = "VidaSync nutrition tracking client", long_about = None)]
struct Cli {
    #[command(subcommand)]
    cmd: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Account and session
    Auth {
        #[command(subcommand)]
        cmd: AuthCmd,
    },

    /// Estimate macros for a foods string ("100g de arroz, 2un de ovo")
    Nutrition { foods: String },

    /// Meals and totals of one day
    Day {
        #[arg(long, value_parser = parse_date)]
        date: Option<String>,
    },

    /// Register and change meals
    Meal {
        #[command(subcommand)]
        cmd: MealCmd,
    },

    /// Month calendar with marked days, optionally one day's meals
    History {
        /// YYYY-MM
        #[arg(long, value_parser = parse_month)]
        month: Option<(i32, u8)>,

        #[arg(long, value_parser = parse_date)]
        day: Option<String>,
    },

    /// Favorite dishes
    Fav {
        #[command(subcommand)]
        cmd: FavCmd,
    },

    /// Local image cache
    Cache {
        #[command(subcommand)]
        cmd: CacheCmd,
    },
}

#[derive(Subcommand)]
enum AuthCmd {
    Signup {
        username: String,
        password: String,
        #[arg(long)]
        photo: Option<PathBuf>,
    },
    Login {
        username: String,
        password: String,
    },
    Logout,
    Whoami,
    /// Change username, password or photo
    Profile {
        #[arg(long)]
        username: Option<String>,
        #[arg(long)]
        password: Option<String>,
        #[arg(long)]
        photo: Option<PathBuf>,
    },
}

#[derive(clap::Args)]
struct DishArgs {
    /// Dish name shown instead of the ingredient list
    #[arg(long)]
    name: Option<String>,

    /// Ingredient such as "100g de arroz"; repeatable
    #[arg(long = "ingredient", short = 'i')]
    ingredients: Vec<String>,

    #[arg(long = "type")]
    meal_type: Option<MealType>,

    /// HH:mm
    #[arg(long, value_parser = parse_time)]
    time: Option<String>,

    #[arg(long)]
    photo: Option<PathBuf>,
}

#[derive(Subcommand)]
enum MealCmd {
    Add {
        #[command(flatten)]
        dish: DishArgs,

        /// Defaults to today
        #[arg(long, value_parser = parse_date)]
        date: Option<String>,
    },
    /// Only the given fields change; new ingredients trigger a recalculation
    Edit {
        id: String,

        /// Day the meal is on
        #[arg(long, value_parser = parse_date)]
        date: Option<String>,

        #[command(flatten)]
        dish: DishArgs,
    },
    Delete {
        id: String,
        #[arg(long, value_parser = parse_date)]
        date: Option<String>,
    },
    /// Copy a meal to the current time
    Duplicate {
        id: String,
        #[arg(long, value_parser = parse_date)]
        date: Option<String>,
    },
    /// Move a meal to another day
    Move {
        id: String,
        #[arg(value_parser = parse_date)]
        to: String,
        #[arg(long, value_parser = parse_date)]
        from: Option<String>,
    },
}

#[derive(Subcommand)]
enum FavCmd {
    List,
    /// Save a registered meal as a favorite
    Add {
        meal_id: String,
        #[arg(long, value_parser = parse_date)]
        date: Option<String>,
    },
    Delete { id: String },
    /// Register a meal from a favorite
    Use {
        id: String,
        #[arg(long = "type")]
        meal_type: MealType,
        #[arg(long, value_parser = parse_date)]
        date: Option<String>,
    },
}

#[derive(Subcommand)]
enum CacheCmd {
    /// Drop cached images of meals no longer present in the last N months
    Prune {
        #[arg(long, default_value_t = 3)]
        months: u32,
    },
}

fn parse_date(s: &str) -> std::result::Result<String, String> {
    calendar::parse_date_str(s)
        .map(calendar::to_date_str)
        .ok_or_else(|| format!("expected YYYY-MM-DD, got {}", s))
}

fn parse_time(s: &str) -> std::result::Result<String, String> {
    let ok = s.len() == 5
        && s.split_once(':').is_some_and(|(h, m)| {
            h.parse::<u8>().is_ok_and(|h| h < 24) && m.parse::<u8>().is_ok_and(|m| m < 60)
        });
    if ok {
        Ok(s.to_string())
    } else {
        Err(format!("expected HH:mm, got {}", s))
    }
}

fn parse_month(s: &str) -> std::result::Result<(i32, u8), String> {
    let (year, month) = s
        .split_once('-')
        .ok_or_else(|| format!("expected YYYY-MM, got {}", s))?;
    let year: i32 = year.parse().map_err(|_| format!("invalid year: {}", year))?;
    let month: u8 = month.parse().map_err(|_| format!("invalid month: {}", month))?;
    if !(1..=12).contains(&month) {
        return Err(format!("invalid month: {}", month));
    }
    Ok((year, month - 1))
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let env_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| "vidasync=info".to_string());
    let json_logs = std::env::var("LOG_FORMAT")
        .map(|v| v == "json")
        .unwrap_or(false);

    if json_logs {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_target(false)
            .with_writer(std::io::stderr)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_writer(std::io::stderr)
            .init();
    }

    let cli = Cli::parse();
    let state = AppState::init().await.context("failed to initialize client state")?;

    if let Err(e) = run(&state, cli.cmd).await {
        tracing::error!(error = %e, "command failed");
        return Err(e);
    }
    Ok(())
}

async fn run(state: &AppState, cmd: Commands) -> Result<()> {
    match cmd {
        Commands::Auth { cmd } => run_auth(state, cmd).await,
        Commands::Nutrition { foods } => {
            let n = get_nutrition(&state.api, &foods).await?;
            print_nutrition(&n);
            Ok(())
        }
        Commands::Day { date } => {
            let store = state.meals_store(date.unwrap_or_else(calendar::today_str));
            store.refresh().await;
            let snap = store.snapshot().await;
            check(snap.error.clone())?;
            print_day(&snap.date, &snap.meals, snap.macro_totals());
            Ok(())
        }
        Commands::Meal { cmd } => run_meal(state, cmd).await,
        Commands::History { month, day } => run_history(state, month, day).await,
        Commands::Fav { cmd } => run_fav(state, cmd).await,
        Commands::Cache { cmd } => run_cache(state, cmd).await,
    }
}

async fn run_auth(state: &AppState, cmd: AuthCmd) -> Result<()> {
    let auth = state.auth();
    match cmd {
        AuthCmd::Signup {
            username,
            password,
            photo,
        } => {
            let image = match photo {
                Some(path) => Some(load_image_file(&path).await?.to_data_uri()),
                None => None,
            };
            let user = auth.signup(&username, &password, image).await?;
            println!("Conta criada: {} ({})", user.username, user.user_id);
        }
        AuthCmd::Login { username, password } => {
            let user = auth.login(&username, &password).await?;
            println!("Olá, {}!", user.username);
        }
        AuthCmd::Logout => {
            auth.logout().await;
            println!("Sessão encerrada.");
        }
        AuthCmd::Whoami => match auth.current_user().await {
            Some(user) => {
                println!("{} ({})", user.username, user.user_id);
                if let Some(url) = user.profile_image_url {
                    println!("foto: {}", url);
                }
            }
            None => println!("Nenhuma sessão ativa."),
        },
        AuthCmd::Profile {
            username,
            password,
            photo,
        } => {
            let profile_image = match photo {
                Some(path) => Some(load_image_file(&path).await?.to_data_uri()),
                None => None,
            };
            let params = ProfileUpdate {
                username,
                password,
                profile_image,
            };
            if params.is_empty() {
                bail!("nothing to update: pass --username, --password or --photo");
            }
            let user = auth.update_profile(&params).await?;
            println!("Perfil atualizado: {}", user.username);
        }
    }
    Ok(())
}

/// A photo is uploaded as a data URI and remembered locally by file URI.
async fn load_photo(photo: Option<&Path>) -> Result<(Option<ImageSource>, Option<String>)> {
    match photo {
        Some(path) => {
            let upload = load_image_file(path)
                .await
                .with_context(|| format!("failed to read photo {}", path.display()))?;
            Ok((
                Some(ImageSource::Upload(upload.to_data_uri())),
                Some(file_uri(path)),
            ))
        }
        None => Ok((None, None)),
    }
}

fn collect_ingredients(raw: &[String]) -> Vec<Ingredient> {
    raw.iter()
        .flat_map(|s| parse_foods_to_ingredients(s))
        .collect()
}

async fn calculate(draft: &MealDraft, state: &AppState) -> Result<NutritionData> {
    match draft.calculate(&state.api).await {
        Some(n) => Ok(n),
        None => {
            let snap = draft.nutrition.snapshot().await;
            Err(anyhow!(snap
                .error
                .unwrap_or_else(|| "informe ao menos um ingrediente".to_string())))
        }
    }
}

async fn find_meal(state: &AppState, id: &str, date: &str) -> Result<Meal> {
    let summary = meals::get_day_summary(&state.api, date).await?;
    summary
        .meals
        .into_iter()
        .find(|m| m.id == id)
        .ok_or_else(|| anyhow!("meal {} not found on {}", id, date))
}

async fn run_meal(state: &AppState, cmd: MealCmd) -> Result<()> {
    match cmd {
        MealCmd::Add { dish, date } => {
            let (image, local) = load_photo(dish.photo.as_deref()).await?;
            let mut draft = MealDraft::new();
            draft.dish_name = dish.name.unwrap_or_default();
            draft
                .set_ingredients(collect_ingredients(&dish.ingredients))
                .await;
            draft.meal_type = Some(dish.meal_type.context("--type is required")?);
            draft.time = dish.time;
            draft.date = date.clone();
            draft.image = image;
            calculate(&draft, state).await?;
            let new_meal = draft.to_new_meal().await?;

            let store = state.meals_store(date.unwrap_or_else(calendar::today_str));
            let created = store.add(new_meal, local.as_deref()).await;
            let snap = store.snapshot().await;
            let created = created.ok_or_else(|| anyhow!(snap.error.clone().unwrap_or_default()))?;
            println!("Refeição registrada: {}", created.id);
            print_day(&snap.date, &snap.meals, snap.macro_totals());
        }
        MealCmd::Edit { id, date, dish } => {
            let date = date.unwrap_or_else(calendar::today_str);
            let meal = find_meal(state, &id, &date).await?;
            let (image, local) = load_photo(dish.photo.as_deref()).await?;

            let mut draft = MealDraft::from_meal(&meal).await;
            if let Some(name) = dish.name {
                draft.dish_name = name;
            }
            if !dish.ingredients.is_empty() {
                draft
                    .set_ingredients(collect_ingredients(&dish.ingredients))
                    .await;
            }
            if let Some(t) = dish.meal_type {
                draft.meal_type = Some(t);
            }
            if dish.time.is_some() {
                draft.time = dish.time;
            }
            if image.is_some() {
                draft.image = image;
            }
            if draft.nutrition.data().await.is_none() {
                calculate(&draft, state).await?;
            }
            let update = draft.to_update().await?;

            let store = state.meals_store(date);
            store.edit(&id, &update, local.as_deref()).await;
            let snap = store.snapshot().await;
            check(snap.error.clone())?;
            println!("Refeição atualizada: {}", id);
            print_day(&snap.date, &snap.meals, snap.macro_totals());
        }
        MealCmd::Delete { id, date } => {
            let store = state.meals_store(date.unwrap_or_else(calendar::today_str));
            if !store.remove(&id).await {
                check(store.snapshot().await.error)?;
            }
            println!("Refeição apagada: {}", id);
        }
        MealCmd::Duplicate { id, date } => {
            let store = state.meals_store(date.unwrap_or_else(calendar::today_str));
            let copy = store.duplicate(&id).await;
            let snap = store.snapshot().await;
            let copy = copy.ok_or_else(|| anyhow!(snap.error.clone().unwrap_or_default()))?;
            println!("Refeição duplicada: {} às {}", copy.id, copy.time);
        }
        MealCmd::Move { id, to, from } => {
            let from = from.unwrap_or_else(calendar::today_str);
            let (year, month0) = month_of(&from)?;
            let store = state.history_store(year, month0, from.clone());
            if !store.move_meal(&id, &to).await {
                check(store.snapshot().await.error)?;
            }
            println!("Refeição movida para {}", to);
        }
    }
    Ok(())
}

fn month_of(date: &str) -> Result<(i32, i32)> {
    let d = calendar::parse_date_str(date).with_context(|| format!("invalid date {}", date))?;
    Ok((d.year(), u8::from(d.month()) as i32 - 1))
}

async fn run_history(state: &AppState, month: Option<(i32, u8)>, day: Option<String>) -> Result<()> {
    let today = calendar::today();
    let (year, month0) = month.unwrap_or((today.year(), u8::from(today.month()) - 1));
    let selected = day.clone().unwrap_or_else(calendar::today_str);
    let store = state.history_store(year, month0 as i32, selected);

    store.load_month().await;
    if let Some(day) = &day {
        store.load_day(day).await;
    }
    let snap = store.snapshot().await;
    check(snap.error.clone())?;

    println!("{}", calendar::month_title(snap.view_year, snap.view_month as i32));
    println!("{}", WEEKDAYS.map(|w| format!("{:>4}", w)).join(""));
    for row in store.calendar_rows().await {
        let line: String = row
            .iter()
            .map(|cell| match cell {
                Some(d) if snap.has_data(*d) => format!("{:>3}*", d),
                Some(d) => format!("{:>3} ", d),
                None => "    ".to_string(),
            })
            .collect();
        println!("{}", line.trim_end());
    }

    if day.is_some() {
        println!();
        let meals: Vec<Meal> = snap.meals_latest_first().into_iter().cloned().collect();
        print_day(&snap.selected_date, &meals, snap.macro_totals());
    }
    Ok(())
}

async fn run_fav(state: &AppState, cmd: FavCmd) -> Result<()> {
    let store = state.favorites_store();
    match cmd {
        FavCmd::List => {
            store.refresh().await;
            let snap = store.snapshot().await;
            check(snap.error)?;
            if snap.favorites.is_empty() {
                println!("Nenhum favorito.");
            }
            for fav in &snap.favorites {
                println!(
                    "{}  {}  ({})",
                    fav.id,
                    Dish::decode(&fav.foods).title(),
                    fav.nutrition.calories
                );
            }
        }
        FavCmd::Add { meal_id, date } => {
            let date = date.unwrap_or_else(calendar::today_str);
            let meal = find_meal(state, &meal_id, &date).await?;
            let image = meal
                .image_url
                .as_deref()
                .map(ImageSource::from_value)
                .filter(|img| img.existing_url().is_some());
            let fav = store.add(&meal.foods, meal.nutrition.clone(), image.as_ref()).await;
            let snap = store.snapshot().await;
            let fav = fav.ok_or_else(|| anyhow!(snap.error.clone().unwrap_or_default()))?;
            println!("Favorito salvo: {}", fav.id);
        }
        FavCmd::Delete { id } => {
            if !store.remove(&id).await {
                check(store.snapshot().await.error)?;
            }
            println!("Favorito removido: {}", id);
        }
        FavCmd::Use {
            id,
            meal_type,
            date,
        } => {
            store.refresh().await;
            let snap = store.snapshot().await;
            check(snap.error)?;
            let fav = snap
                .favorites
                .into_iter()
                .find(|f| f.id == id)
                .ok_or_else(|| anyhow!("favorite {} not found", id))?;

            let image = fav.image_url.map(ImageSource::from_value);
            let mut new_meal = NewMeal::new(fav.foods, meal_type).with_image(image.as_ref());
            new_meal.nutrition = Some(fav.nutrition);

            let meals_store = state.meals_store(date.unwrap_or_else(calendar::today_str));
            let created = meals_store.add(new_meal, None).await;
            let snap = meals_store.snapshot().await;
            let created = created.ok_or_else(|| anyhow!(snap.error.clone().unwrap_or_default()))?;
            println!("Refeição registrada: {}", created.id);
        }
    }
    Ok(())
}

async fn run_cache(state: &AppState, cmd: CacheCmd) -> Result<()> {
    match cmd {
        CacheCmd::Prune { months } => {
            if months == 0 {
                bail!("--months must be at least 1");
            }
            let today = calendar::today();
            let (year, month0) = (today.year(), u8::from(today.month()) as i32 - 1);
            let start = calendar::month_range(year, month0 - (months as i32 - 1)).start_date;
            let end = calendar::month_range(year, month0).end_date;

            let active = meals::get_meals_by_range(&state.api, &start, &end).await?;
            let ids: Vec<String> = active.into_iter().map(|m| m.id).collect();
            let removed = state.images.cleanup_cache(ids.as_slice()).await;
            println!(
                "{} imagem(ns) removida(s) do cache; {} restante(s)",
                removed,
                state.images.len().await
            );
        }
    }
    Ok(())
}

fn check(error: Option<String>) -> Result<()> {
    match error {
        Some(msg) => Err(anyhow!(msg)),
        None => Ok(()),
    }
}

fn print_nutrition(n: &NutritionData) {
    println!("Calorias:     {}", n.calories);
    println!("Proteínas:    {}", n.protein);
    println!("Carboidratos: {}", n.carbs);
    println!("Gorduras:     {}", n.fat);
}

fn print_day(date: &str, meals: &[Meal], totals: MacroTotals) {
    let label = calendar::parse_date_str(date)
        .map(calendar::format_day_label)
        .unwrap_or_else(|| date.to_string());
    println!("{}", label);
    if meals.is_empty() {
        println!("  Nenhuma refeição registrada.");
    }
    for meal in meals {
        let photo = if meal.image_url.is_some() { " [foto]" } else { "" };
        println!(
            "  {}  {:<14} {}  ({}){}  #{}",
            meal.time,
            meal.meal_type.label(),
            Dish::decode(&meal.foods).title(),
            meal.nutrition.calories,
            photo,
            meal.id
        );
    }
    println!(
        "  Total: {} kcal | prot {}g | carb {}g | gord {}g",
        totals.calories, totals.protein, totals.carbs, totals.fat
    );
}
