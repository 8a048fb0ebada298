use std::sync::{Arc, Mutex, PoisonError};

use anyhow::{Context, Result, anyhow};
use entity::{Employee, EmployeeId};
use platform_forms::FormError;
use platform_gateway::RestGateway;
use products_hr::{
    EmployeeDetails, EmployeeEditor, EmployeeForm, EmployeeList, FormSettings, Navigator, Route,
    SubmitError, SubmitPolicy, fields,
};
use tracing::{debug, warn};

use crate::{Command, EmployeeArgs, config::AppConfig};

const FORM_FIELDS: [&str; 8] = [
    fields::FIRST_NAME,
    fields::LAST_NAME,
    fields::EMAIL,
    fields::CONTACT_PREFERENCE,
    fields::PHONE,
    fields::SKILL_NAME,
    fields::EXPERIENCE_IN_YEARS,
    fields::PROFICIENCY,
];

/// Remembers the last requested route so the console can render it after a command.
#[derive(Default)]
pub struct ConsoleNavigator {
    pending: Mutex<Option<Route>>,
}

impl ConsoleNavigator {
    fn take(&self) -> Option<Route> {
        self.pending
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
    }
}

impl Navigator for ConsoleNavigator {
    fn navigate(&self, route: Route) {
        debug!(%route, "navigating");
        *self.pending.lock().unwrap_or_else(PoisonError::into_inner) = Some(route);
    }
}

type Gateway = Arc<RestGateway<Employee>>;

struct Console {
    gateway: Gateway,
    navigator: Arc<ConsoleNavigator>,
    settings: FormSettings,
    policy: SubmitPolicy,
}

pub async fn run(command: Command, config: &AppConfig) -> Result<()> {
    let gateway = RestGateway::new(&config.gateway_config())
        .with_context(|| format!("invalid EMPLOYEE_API_URL {}", config.api_url))?;
    let console = Console {
        gateway: Arc::new(gateway),
        navigator: Arc::new(ConsoleNavigator::default()),
        settings: config.form_settings()?,
        policy: config.submit_policy,
    };
    match command {
        Command::List => console.render(Route::List).await,
        Command::Show { id } => console.render(Route::EmployeeDetails(id)).await,
        Command::Create(args) => console.create(args).await,
        Command::Update { id, fields } => console.update(id, fields).await,
        Command::Delete { id } => console.delete(id).await,
        Command::Open { route } => {
            let route = Route::parse(&route)?;
            console.render(route).await
        }
    }
}

impl Console {
    fn list(&self) -> EmployeeList<Gateway, Arc<ConsoleNavigator>> {
        EmployeeList::new(self.gateway.clone(), self.navigator.clone())
    }

    fn policy_for(&self, args: &EmployeeArgs) -> SubmitPolicy {
        if args.strict {
            SubmitPolicy::RequireValid
        } else {
            self.policy
        }
    }

    async fn render(&self, route: Route) -> Result<()> {
        match route {
            Route::List => {
                let mut list = self.list();
                let rows = list.refresh().await.context("failed to load employees")?;
                print_table(rows);
            }
            Route::EmployeeDetails(id) => {
                let details = EmployeeDetails::load(&self.gateway, id)
                    .await
                    .with_context(|| format!("failed to load employee {id}"))?;
                println!("{details}");
            }
            Route::Create => print_form(&EmployeeForm::new(self.settings.clone())),
            Route::UpdateEmployee(id) => {
                let editor = self.load_editor(id).await?;
                print_form(editor.form());
            }
        }
        Ok(())
    }

    async fn load_editor(
        &self,
        id: EmployeeId,
    ) -> Result<EmployeeEditor<Gateway, Arc<ConsoleNavigator>>> {
        EmployeeEditor::load(
            self.gateway.clone(),
            self.navigator.clone(),
            self.settings.clone(),
            id,
        )
        .await
        .with_context(|| format!("failed to load employee {id}"))
    }

    async fn create(&self, args: EmployeeArgs) -> Result<()> {
        let mut editor = EmployeeEditor::create(
            self.gateway.clone(),
            self.navigator.clone(),
            self.settings.clone(),
        )
        .with_policy(self.policy_for(&args));
        fill(editor.form_mut(), &args)?;
        self.submit(editor).await
    }

    async fn update(&self, id: EmployeeId, args: EmployeeArgs) -> Result<()> {
        let editor = self.load_editor(id).await?;
        let mut editor = editor.with_policy(self.policy_for(&args));
        fill(editor.form_mut(), &args)?;
        self.submit(editor).await
    }

    async fn submit(
        &self,
        mut editor: EmployeeEditor<Gateway, Arc<ConsoleNavigator>>,
    ) -> Result<()> {
        for (field, message) in editor.form().errors().visible() {
            warn!(field, message, "field is invalid");
        }
        match editor.submit().await {
            Ok(payload) => {
                if !payload.is_null() {
                    println!("saved: {payload}");
                }
            }
            Err(SubmitError::Invalid(errors)) => {
                return Err(anyhow!("employee not saved:\n{errors}"));
            }
            Err(err) => return Err(err).context("employee not saved"),
        }
        match self.navigator.take() {
            Some(route) => self.render(route).await,
            None => Ok(()),
        }
    }

    async fn delete(&self, id: EmployeeId) -> Result<()> {
        let mut list = self.list();
        let outcome = list.delete(id).await;
        print_table(list.employees());
        outcome
            .map(|_| ())
            .with_context(|| format!("failed to delete employee {id}"))
    }
}

/// Applies the provided flags as user edits, contact preference first so the
/// phone requirement is in place before the phone value is validated.
fn fill(form: &mut EmployeeForm, args: &EmployeeArgs) -> Result<(), FormError> {
    if let Some(preference) = args.contact_preference {
        form.on_contact_preference_change(preference)?;
        form.touch(fields::CONTACT_PREFERENCE)?;
    }
    let values = [
        (fields::FIRST_NAME, &args.first_name),
        (fields::LAST_NAME, &args.last_name),
        (fields::EMAIL, &args.email),
        (fields::PHONE, &args.phone),
        (fields::SKILL_NAME, &args.skill_name),
        (fields::EXPERIENCE_IN_YEARS, &args.experience),
        (fields::PROFICIENCY, &args.proficiency),
    ];
    for (field, value) in values {
        if let Some(value) = value {
            form.set_value(field, value.as_str())?;
            form.touch(field)?;
        }
    }
    Ok(())
}

fn print_table(rows: &[Employee]) {
    if rows.is_empty() {
        println!("no employees");
        return;
    }
    println!("{:<6}{:<24}{:<30}{}", "ID", "NAME", "EMAIL", "CONTACT");
    for employee in rows {
        let id = employee.id.map(|id| id.to_string()).unwrap_or_default();
        println!(
            "{:<6}{:<24}{:<30}{}",
            id,
            employee.full_name(),
            employee.email,
            employee.contact_preference
        );
    }
}

fn print_form(form: &EmployeeForm) {
    for path in FORM_FIELDS {
        let leaf = path.rsplit('.').next().unwrap_or(path);
        let value = form.form().value(path).unwrap_or_default();
        println!("{leaf:<20}{value}");
        let error = form.error(leaf);
        if !error.is_empty() {
            println!("{:<20}! {error}", "");
        }
    }
}
