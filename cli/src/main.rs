use clap::{Parser, Subcommand};
use coursehub::model::entity::{
    Course,
    CourseCategory,
    CourseCreate,
    Difficulty,
    Lesson,
    LessonCreate,
    Module,
    ModuleCreate,
    UserEntity,
    UserEntityCreateUpdate,
};
use coursehub::model::{CrudRepository, DatabaseError, DbConnection, ModelManager};
use coursehub::web::{AuthenticatedUser, UserRole};

#[derive(Parser, Debug)]
#[command(about = "CLI tool for filling the course catalogue", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Manage users
    User {
        #[command(subcommand)]
        action: UserCommands,
    },

    /// Manage courses
    Course {
        #[command(subcommand)]
        action: CourseCommands,
    },

    /// Manage modules
    Module {
        #[command(subcommand)]
        action: ModuleCommands,
    },

    /// Manage lessons
    Lesson {
        #[command(subcommand)]
        action: LessonCommands,
    },
}

/// User management
#[derive(Subcommand, Debug)]
pub enum UserCommands {
    Add {
        #[arg(long)]
        username: String,
        #[arg(long)]
        password: String,
        /// student, instructor or admin
        #[arg(long, default_value = "student")]
        role: String,
    },
}

/// Course management
#[derive(Subcommand, Debug)]
pub enum CourseCommands {
    Add {
        /// Instructor that will own the course
        #[arg(long)]
        instructor: String,
        #[arg(long)]
        title: String,
        #[arg(long, default_value = "")]
        description: String,
        #[arg(long, default_value = "other")]
        category: String,
        #[arg(long, default_value = "beginner")]
        difficulty: String,
        #[arg(long, default_value_t = 0)]
        price_cents: i64,
    },
}

/// Module management
#[derive(Subcommand, Debug)]
pub enum ModuleCommands {
    Add {
        /// Course title to attach the module to
        #[arg(long)]
        course_title: String,
        #[arg(long)]
        title: String,
        #[arg(long, default_value = "")]
        description: String,
        /// Appended last when omitted
        #[arg(long)]
        order_index: Option<i32>,
    },
}

/// Lesson management
#[derive(Subcommand, Debug)]
pub enum LessonCommands {
    Add {
        /// Module title to attach the lesson to
        #[arg(long)]
        module_title: String,
        #[arg(long)]
        title: String,
        /// Path to a Markdown file with the lesson description
        #[arg(long)]
        file: Option<String>,
        #[arg(long)]
        video_url: Option<String>,
        #[arg(long)]
        duration_seconds: Option<i32>,
        #[arg(long)]
        order_index: Option<i32>,
    },
}

async fn lookup_id(mm: &ModelManager, query: &str, value: &str) -> Result<uuid::Uuid, DatabaseError> {
    sqlx::query_scalar(query)
        .bind(value)
        .fetch_one(mm.executor())
        .await
        .map_err(DatabaseError::SqlxError)
}

#[tokio::main]
async fn main() -> coursehub::error::AppResult<()> {
    let _ = dotenvy::dotenv();
    let args = Cli::parse();

    let config = coursehub::Config::get_or_init(cfg!(debug_assertions)).await;
    let db_con = DbConnection::connect(config.app().database_uri())?;
    db_con.migrate().await?;
    let mm = ModelManager::new(db_con);
    let admin = AuthenticatedUser::admin();

    match args.command {
        Commands::User { action } => match action {
            UserCommands::Add { username, password, role } => {
                let password_hash = coursehub::auth::hash_password(&password)
                    .map_err(|e| std::io::Error::other(e.to_string()))?;
                let user = UserEntity::create(
                    &mm,
                    &admin,
                    UserEntityCreateUpdate {
                        username,
                        password_hash,
                    },
                )
                .await?
                .set_role(&mm, &admin, UserRole::from(role.as_str()))
                .await?;
                println!("User created: {} ({})", user.username(), user.role());
            }
        },

        Commands::Course { action } => match action {
            CourseCommands::Add {
                instructor,
                title,
                description,
                category,
                difficulty,
                price_cents,
            } => {
                let owner = UserEntity::find_by_username(&mm, &admin, &instructor)
                    .await?
                    .ok_or_else(|| {
                        std::io::Error::new(
                            std::io::ErrorKind::NotFound,
                            format!("no user named `{instructor}`"),
                        )
                    })?;
                let actor = AuthenticatedUser::new(owner.id(), owner.role());

                let course = Course::create(
                    &mm,
                    &actor,
                    CourseCreate {
                        title,
                        description,
                        category: CourseCategory::from(category.as_str()),
                        difficulty: Difficulty::from(difficulty.as_str()),
                        price_cents: Some(price_cents),
                        thumbnail_url: None,
                    },
                )
                .await?;
                println!("Course created: {:?}", course);
            }
        },

        Commands::Module { action } => match action {
            ModuleCommands::Add {
                course_title,
                title,
                description,
                order_index,
            } => {
                let course_id =
                    lookup_id(&mm, "SELECT id FROM courses WHERE title = $1", &course_title).await?;

                let module = Module::create(
                    &mm,
                    &admin,
                    ModuleCreate {
                        course_id,
                        title,
                        description,
                        order_index,
                    },
                )
                .await?;
                println!("Module created: {:?}", module);
            }
        },

        Commands::Lesson { action } => match action {
            LessonCommands::Add {
                module_title,
                title,
                file,
                video_url,
                duration_seconds,
                order_index,
            } => {
                let module_id =
                    lookup_id(&mm, "SELECT id FROM course_modules WHERE title = $1", &module_title)
                        .await?;

                let description = match file {
                    Some(path) => std::fs::read_to_string(path)?,
                    None => String::new(),
                };
                let lesson = Lesson::create(
                    &mm,
                    &admin,
                    LessonCreate {
                        module_id,
                        title,
                        description,
                        video_url,
                        duration_seconds,
                        order_index,
                    },
                )
                .await?;
                println!("Lesson created: {:?}", lesson);
            }
        },
    }

    Ok(())
}
