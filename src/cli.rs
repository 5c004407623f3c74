//! Terminal client: a line-oriented prompt over the portal flows.
//!
//! Every page change goes through the route guard (using the cookie mirror,
//! the way a browser request would) and, for `/onboarding`, the status
//! resolver. Forms take `key=value` pairs; quote values with spaces.

use std::collections::BTreeMap;
use std::sync::Arc;

use anyhow::{Context, anyhow, bail};
use tokio::io::{AsyncBufReadExt, BufReader};
use uuid::Uuid;

use crate::account::Account;
use crate::api::ApiClient;
use crate::error::SubmitError;
use crate::guard::{self, GuardDecision};
use crate::model::{AppointmentStatus, PhoneNumber, Role};
use crate::onboarding::{self, OnboardingFlow, Resolution};
use crate::session::CookieBackend;
use crate::validation::{
    AppointmentForm, AppointmentUpdateForm, ClinicInfoForm, CompanyInfoForm, LoginForm,
    MicrochipForm, PersonalInfoForm, PetForm, PetUpdateForm, RegisterForm, ResendOtpForm,
    VerifyEmailForm,
};

const HELP: &str = "\
Navigation:   go <path> | menu | whoami | refresh
Account:      register email= password= confirm= role=USER|VET
              verify email= otp= | resend email= | login email= password= | logout
Onboarding:   personal [firstName= lastName= birthDate= gender= tcIdentityNo= phone=+90...]
              company [companyName= companyType= taxOffice= taxNumber= cityId= districtId= address=]
              clinic [clinicName= clinicEmail= clinicPhone= cityId= districtId= address=]
              finish
Pets:         pets | pet <id> | addpet name= type= breed= birthDate= gender= color= [allergies=]
              editpet <id> [name= breed= birthDate= color= allergies=] | delpet <id>
              chip <id> chipNumber= chipDate=
Appointments: appointments [petId] | book petId= type= title= date=YYYY-MM-DDTHH:MM [notes=]
              [vaccineType= treatmentType= surgeryType=] | status <id> SCHEDULED|COMPLETED|CANCELLED
              cancel <id>
Other:        help | quit";

const MAX_REDIRECTS: usize = 4;

/// What the prompt should do after a command.
#[derive(Debug, PartialEq, Eq)]
pub enum Reply {
    Output(String),
    Quit,
}

/// Parsed command line: a verb, positional words, and `key=value` pairs.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct CommandLine {
    pub verb: String,
    pub positional: Vec<String>,
    pub fields: BTreeMap<String, String>,
}

impl CommandLine {
    pub fn parse(line: &str) -> Result<Self, String> {
        let mut words = shell_words::split(line)
            .map_err(|e| format!("cannot parse command: {e}"))?
            .into_iter();
        let Some(verb) = words.next() else {
            return Ok(Self::default());
        };
        let mut parsed = Self {
            verb: verb.to_ascii_lowercase(),
            ..Self::default()
        };
        for word in words {
            match word.split_once('=') {
                Some((key, value)) if !key.is_empty() => {
                    parsed.fields.insert(key.to_string(), value.to_string());
                }
                _ => parsed.positional.push(word),
            }
        }
        Ok(parsed)
    }

    fn field(&self, key: &str) -> Option<&str> {
        self.fields.get(key).map(String::as_str)
    }

    fn text(&self, key: &str) -> String {
        self.field(key).unwrap_or_default().to_string()
    }

    fn id(&self, what: &str) -> anyhow::Result<Uuid> {
        let raw = self
            .positional
            .first()
            .ok_or_else(|| anyhow!("missing {what} id"))?;
        Uuid::parse_str(raw).with_context(|| format!("'{raw}' is not a valid {what} id"))
    }

    fn parsed<T>(&self, key: &str) -> anyhow::Result<Option<T>>
    where
        T: std::str::FromStr,
        T::Err: std::fmt::Display,
    {
        self.field(key)
            .map(|raw| raw.parse::<T>().map_err(|e| anyhow!("{key}: {e}")))
            .transpose()
    }
}

/// The terminal client's state: one API client, the cookie mirror the guard
/// reads, and the current page.
pub struct Portal {
    api: Arc<ApiClient>,
    cookies: Arc<CookieBackend>,
    location: String,
}

impl Portal {
    pub fn new(api: Arc<ApiClient>, cookies: Arc<CookieBackend>) -> Self {
        Self {
            api,
            cookies,
            location: "/".to_string(),
        }
    }

    pub fn location(&self) -> &str {
        &self.location
    }

    /// Run the prompt until `quit` or end of input.
    pub async fn run(&mut self) -> anyhow::Result<()> {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        eprint!("{}> ", self.location);
        while let Some(line) = lines.next_line().await? {
            let line = line.trim();
            if !line.is_empty() {
                match self.handle(line).await {
                    Ok(Reply::Quit) => break,
                    Ok(Reply::Output(text)) => println!("{text}"),
                    Err(e) => eprintln!("error: {e:#}"),
                }
            }
            eprint!("{}> ", self.location);
        }
        Ok(())
    }

    /// Execute one command line.
    pub async fn handle(&mut self, line: &str) -> anyhow::Result<Reply> {
        let cmd = CommandLine::parse(line).map_err(|e| anyhow!(e))?;
        let output = match cmd.verb.as_str() {
            "" => String::new(),
            "help" => HELP.to_string(),
            "quit" | "exit" => return Ok(Reply::Quit),
            "go" => {
                let path = cmd.positional.first().map_or("/", String::as_str).to_string();
                self.navigate(&path).await
            }
            "menu" => self.menu().await,
            "whoami" => self.whoami().await,
            "refresh" => {
                let user = Account::new(&self.api).refresh_user().await?;
                format!("refreshed {} ({})", user.email, user.role)
            }

            "register" => {
                let form = RegisterForm {
                    email: cmd.text("email"),
                    password: cmd.text("password"),
                    confirm_password: cmd.text("confirm"),
                    role: cmd.parsed::<Role>("role")?,
                };
                let target = Account::new(&self.api).register(&form).await;
                self.follow(target).await
            }
            "verify" => {
                let form = VerifyEmailForm {
                    email: cmd.text("email"),
                    otp: cmd.text("otp"),
                };
                let target = Account::new(&self.api).verify_email(&form).await;
                self.follow(target.map(str::to_string)).await
            }
            "resend" => {
                let form = ResendOtpForm { email: cmd.text("email") };
                match Account::new(&self.api).resend_otp(&form).await {
                    Ok(()) => "verification code sent".to_string(),
                    Err(e) => render_submit_error(&e),
                }
            }
            "login" => {
                let form = LoginForm::new(cmd.text("email"), cmd.text("password"));
                let target = Account::new(&self.api).login(&form).await;
                self.follow(target.map(str::to_string)).await
            }
            "logout" => {
                let target = Account::new(&self.api).logout().await?;
                self.navigate(target).await
            }

            "personal" => self.personal(&cmd).await?,
            "company" => self.company(&cmd).await?,
            "clinic" => self.clinic(&cmd).await?,
            "finish" => {
                let target = OnboardingFlow::new(&self.api).finish().await?;
                self.navigate(target).await
            }

            "pets" => {
                let pets = self.api.pets().list().await?;
                if pets.is_empty() {
                    "no pets".to_string()
                } else {
                    pets.iter()
                        .map(|p| format!("{}  {} ({:?}, {})", p.id, p.name, p.pet_type, p.breed))
                        .collect::<Vec<_>>()
                        .join("\n")
                }
            }
            "pet" => {
                let pet = self.api.pets().get(cmd.id("pet")?).await?;
                serde_json::to_string_pretty(&pet)?
            }
            "addpet" => {
                let form = PetForm {
                    name: cmd.text("name"),
                    pet_type: cmd.parsed("type")?.unwrap_or_default(),
                    breed: cmd.text("breed"),
                    birth_date: cmd.text("birthDate"),
                    gender: cmd.parsed("gender")?.unwrap_or_default(),
                    color: cmd.text("color"),
                    allergies: cmd.text("allergies"),
                };
                match form.to_request() {
                    Ok(request) => {
                        let pet = self.api.pets().create(&request).await?;
                        format!("added {} ({})", pet.name, pet.id)
                    }
                    Err(errors) => render_submit_error(&SubmitError::from(errors)),
                }
            }
            "editpet" => {
                let id = cmd.id("pet")?;
                let form = PetUpdateForm {
                    name: cmd.field("name").map(str::to_string),
                    breed: cmd.field("breed").map(str::to_string),
                    birth_date: cmd.field("birthDate").map(str::to_string),
                    color: cmd.field("color").map(str::to_string),
                    allergies: cmd.field("allergies").map(str::to_string),
                };
                if form.is_empty() {
                    bail!("nothing to change");
                }
                match form.to_request() {
                    Ok(request) => {
                        let pet = self.api.pets().update(id, &request).await?;
                        format!("updated {}", pet.name)
                    }
                    Err(errors) => render_submit_error(&SubmitError::from(errors)),
                }
            }
            "delpet" => {
                let id = cmd.id("pet")?;
                self.api.pets().delete(id).await?;
                format!("deleted {id}")
            }
            "chip" => {
                let id = cmd.id("pet")?;
                let form = MicrochipForm {
                    chip_number: cmd.text("chipNumber"),
                    chip_date: cmd.text("chipDate"),
                };
                match form.to_request() {
                    Ok(request) => {
                        let chip = self.api.pets().add_microchip(id, &request).await?;
                        format!("microchip {} registered", chip.chip_number)
                    }
                    Err(errors) => render_submit_error(&SubmitError::from(errors)),
                }
            }

            "appointments" => {
                let appointments = match cmd.positional.first() {
                    Some(_) => self.api.appointments().by_pet(cmd.id("pet")?).await?,
                    None => self.api.appointments().list().await?,
                };
                if appointments.is_empty() {
                    "no appointments".to_string()
                } else {
                    appointments
                        .iter()
                        .map(|a| {
                            format!(
                                "{}  {}  {:?}  {}  [{:?}]",
                                a.id,
                                a.appointment_date.format("%Y-%m-%d %H:%M"),
                                a.appointment_type,
                                a.title,
                                a.status
                            )
                        })
                        .collect::<Vec<_>>()
                        .join("\n")
                }
            }
            "book" => {
                let form = AppointmentForm {
                    pet_id: cmd.text("petId"),
                    appointment_type: cmd.parsed("type")?.unwrap_or_default(),
                    title: cmd.text("title"),
                    appointment_date: cmd.text("date"),
                    notes: cmd.text("notes"),
                    vaccine_type: cmd.text("vaccineType"),
                    treatment_type: cmd.text("treatmentType"),
                    surgery_type: cmd.text("surgeryType"),
                };
                match form.to_request() {
                    Ok(request) => {
                        let created = self.api.appointments().create(&request).await?;
                        format!("booked {} ({})", created.title, created.id)
                    }
                    Err(errors) => render_submit_error(&SubmitError::from(errors)),
                }
            }
            "status" => {
                let id = cmd.id("appointment")?;
                let status = cmd
                    .positional
                    .get(1)
                    .ok_or_else(|| anyhow!("missing status"))?
                    .parse::<AppointmentStatus>()
                    .map_err(|e| anyhow!(e))?;
                let form = AppointmentUpdateForm {
                    status: Some(status),
                    ..Default::default()
                };
                match form.to_request() {
                    Ok(request) => {
                        let updated = self.api.appointments().update(id, &request).await?;
                        format!("{} is now {:?}", updated.title, updated.status)
                    }
                    Err(errors) => render_submit_error(&SubmitError::from(errors)),
                }
            }
            "cancel" => {
                let id = cmd.id("appointment")?;
                self.api.appointments().delete(id).await?;
                format!("removed {id}")
            }

            other => bail!("unknown command '{other}' (try 'help')"),
        };
        Ok(Reply::Output(output))
    }

    // ── Navigation ──────────────────────────────────────────────────────

    /// Open `path`, following guard redirects and the onboarding resolver.
    async fn navigate(&mut self, path: &str) -> String {
        let session = self.cookies.session().await;
        let mut lines = Vec::new();
        let mut target = path.to_string();

        for _ in 0..MAX_REDIRECTS {
            let GuardDecision::Redirect(next) = guard::evaluate(&target, &session) else {
                break;
            };
            lines.push(format!("{target} -> {next}"));
            target = next;
        }

        if guard::routes::normalize(&target) == onboarding::ONBOARDING_PATH {
            match onboarding::resolve(&self.api).await {
                Resolution::Redirect(next) => {
                    lines.push(format!("{target} -> {next}"));
                    target = next.to_string();
                }
                Resolution::Loading => lines.push("onboarding status unavailable".to_string()),
            }
        }

        lines.push(format!("at {target}"));
        self.location = target;
        lines.join("\n")
    }

    async fn follow(&mut self, result: Result<String, SubmitError>) -> String {
        match result {
            Ok(target) => self.navigate(&target).await,
            Err(e) => render_submit_error(&e),
        }
    }

    async fn menu(&self) -> String {
        let Some(user) = self.api.session().current_user().await else {
            return "sign in to see the menu".to_string();
        };
        guard::menu_for(user.role)
            .iter()
            .map(|item| format!("{:<18} {}", item.label, item.href))
            .collect::<Vec<_>>()
            .join("\n")
    }

    async fn whoami(&self) -> String {
        match self.api.session().current_user().await {
            Some(user) => {
                let step = user
                    .onboarding_step
                    .map(|s| s.to_string())
                    .unwrap_or_else(|| "-".to_string());
                format!(
                    "{} <{}> ({}), onboarding step {step}",
                    user.display_name(),
                    user.email,
                    user.role
                )
            }
            None => "not signed in".to_string(),
        }
    }

    // ── Onboarding forms ────────────────────────────────────────────────

    async fn personal(&mut self, cmd: &CommandLine) -> anyhow::Result<String> {
        let flow = OnboardingFlow::new(&self.api);
        let mut form: PersonalInfoForm = flow.load_personal_info().await;
        if cmd.fields.is_empty() {
            return Ok(format!("{form:#?}"));
        }
        apply(cmd, "firstName", &mut form.first_name);
        apply(cmd, "lastName", &mut form.last_name);
        apply(cmd, "birthDate", &mut form.birth_date);
        apply(cmd, "tcIdentityNo", &mut form.tc_identity_no);
        if let Some(gender) = cmd.parsed("gender")? {
            form.gender = gender;
        }
        if let Some(phone) = cmd.field("phone") {
            form.phone = parse_phone(phone)?;
        }
        let result = flow.submit_personal_info(&form).await;
        Ok(self.follow(result.map(str::to_string)).await)
    }

    async fn company(&mut self, cmd: &CommandLine) -> anyhow::Result<String> {
        let flow = OnboardingFlow::new(&self.api);
        let mut form: CompanyInfoForm = flow.load_company_info().await;
        if cmd.fields.is_empty() {
            return Ok(format!("{form:#?}"));
        }
        apply(cmd, "companyName", &mut form.company_name);
        apply(cmd, "taxOffice", &mut form.tax_office);
        apply(cmd, "taxNumber", &mut form.tax_number);
        apply(cmd, "address", &mut form.address);
        if let Some(kind) = cmd.parsed("companyType")? {
            form.company_type = kind;
        }
        if let Some(city) = cmd.parsed::<u32>("cityId")? {
            form.select_city(city);
        }
        if let Some(district) = cmd.parsed::<u32>("districtId")? {
            form.district_id = district;
        }
        let result = flow.submit_company_info(&form).await;
        Ok(self.follow(result.map(str::to_string)).await)
    }

    async fn clinic(&mut self, cmd: &CommandLine) -> anyhow::Result<String> {
        let flow = OnboardingFlow::new(&self.api);
        let mut form: ClinicInfoForm = flow.load_clinic_info().await;
        if cmd.fields.is_empty() {
            return Ok(format!("{form:#?}"));
        }
        apply(cmd, "clinicName", &mut form.clinic_name);
        apply(cmd, "clinicEmail", &mut form.clinic_email);
        apply(cmd, "address", &mut form.address);
        if let Some(phone) = cmd.field("clinicPhone") {
            form.clinic_phone = parse_phone(phone)?;
        }
        if let Some(city) = cmd.parsed::<u32>("cityId")? {
            form.select_city(city);
        }
        if let Some(district) = cmd.parsed::<u32>("districtId")? {
            form.district_id = district;
        }
        let result = flow.submit_clinic_info(&form).await;
        Ok(self.follow(result.map(str::to_string)).await)
    }
}

fn apply(cmd: &CommandLine, key: &str, slot: &mut String) {
    if let Some(value) = cmd.field(key) {
        *slot = value.to_string();
    }
}

fn parse_phone(raw: &str) -> anyhow::Result<PhoneNumber> {
    PhoneNumber::parse(raw).ok_or_else(|| anyhow!("phone: expected +<country code><number>, e.g. +905321234567"))
}

/// Inline message plus one line per field error.
pub fn render_submit_error(error: &SubmitError) -> String {
    let mut lines = vec![error.inline_message().to_string()];
    if let Some(fields) = error.field_errors() {
        lines.extend(fields.iter().map(|(field, message)| format!("  {field}: {message}")));
    } else {
        lines.push(format!("  ({error})"));
    }
    lines.join("\n")
}
