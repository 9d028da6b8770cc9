use serde::{Deserialize, Serialize};
use std::fmt;

// --- Field identity ---

/// How a field's raw text is interpreted at submission time.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldKind {
    Integer,
    Decimal,
    Choice,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FormField {
    CreditAmount,
    Duration,
    Age,
    CheckingStatus,
    CreditHistory,
    Employment,
    Savings,
    Purpose,
    InstallmentRate,
    PersonalStatus,
    OtherDebtors,
    ResidenceSince,
    Property,
    OtherInstallment,
    Housing,
    ExistingCredits,
    Job,
    PeopleLiable,
    Telephone,
    ForeignWorker,
}

impl FormField {
    pub const COUNT: usize = 20;

    /// Display order of the application form.
    pub const ALL: [FormField; Self::COUNT] = [
        FormField::CreditAmount,
        FormField::Duration,
        FormField::Age,
        FormField::CheckingStatus,
        FormField::CreditHistory,
        FormField::Employment,
        FormField::Savings,
        FormField::Purpose,
        FormField::InstallmentRate,
        FormField::PersonalStatus,
        FormField::OtherDebtors,
        FormField::ResidenceSince,
        FormField::Property,
        FormField::OtherInstallment,
        FormField::Housing,
        FormField::ExistingCredits,
        FormField::Job,
        FormField::PeopleLiable,
        FormField::Telephone,
        FormField::ForeignWorker,
    ];

    /// Name used by the form (and by shells sending `FieldChanged`).
    pub const fn form_name(self) -> &'static str {
        match self {
            FormField::CreditAmount => "creditAmount",
            FormField::Duration => "duration",
            FormField::Age => "age",
            FormField::CheckingStatus => "checkingStatus",
            FormField::CreditHistory => "creditHistory",
            FormField::Employment => "employment",
            FormField::Savings => "savings",
            FormField::Purpose => "purpose",
            FormField::InstallmentRate => "installmentRate",
            FormField::PersonalStatus => "personalStatus",
            FormField::OtherDebtors => "otherDebtors",
            FormField::ResidenceSince => "residenceSince",
            FormField::Property => "property",
            FormField::OtherInstallment => "otherInstallment",
            FormField::Housing => "housing",
            FormField::ExistingCredits => "existingCredits",
            FormField::Job => "job",
            FormField::PeopleLiable => "peopleLiable",
            FormField::Telephone => "telephone",
            FormField::ForeignWorker => "foreignWorker",
        }
    }

    /// Key of this field in the scoring service's request body.
    pub const fn service_key(self) -> &'static str {
        match self {
            FormField::CreditAmount => "credit_amount",
            FormField::Duration => "duration",
            FormField::Age => "age",
            FormField::CheckingStatus => "checking_status",
            FormField::CreditHistory => "credit_history",
            FormField::Employment => "employment",
            FormField::Savings => "savings",
            FormField::Purpose => "purpose",
            FormField::InstallmentRate => "installment_rate",
            FormField::PersonalStatus => "personal_status",
            FormField::OtherDebtors => "other_debtors",
            FormField::ResidenceSince => "residence_since",
            FormField::Property => "property",
            FormField::OtherInstallment => "other_installment",
            FormField::Housing => "housing",
            FormField::ExistingCredits => "existing_credits",
            FormField::Job => "job",
            FormField::PeopleLiable => "people_liable",
            FormField::Telephone => "telephone",
            FormField::ForeignWorker => "foreign_worker",
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            FormField::CreditAmount => "Credit Amount",
            FormField::Duration => "Duration (Months)",
            FormField::Age => "Age",
            FormField::CheckingStatus => "Account Status",
            FormField::CreditHistory => "Credit History",
            FormField::Employment => "Employment",
            FormField::Savings => "Savings",
            FormField::Purpose => "Purpose",
            FormField::InstallmentRate => "Installment Rate",
            FormField::PersonalStatus => "Personal Status",
            FormField::OtherDebtors => "Other Debtors",
            FormField::ResidenceSince => "Residence Since",
            FormField::Property => "Property",
            FormField::OtherInstallment => "Other Installment Plans",
            FormField::Housing => "Housing",
            FormField::ExistingCredits => "Existing Credits",
            FormField::Job => "Job",
            FormField::PeopleLiable => "People Liable",
            FormField::Telephone => "Telephone",
            FormField::ForeignWorker => "Foreign Worker",
        }
    }

    pub const fn kind(self) -> FieldKind {
        match self {
            FormField::CreditAmount => FieldKind::Decimal,
            FormField::Duration
            | FormField::Age
            | FormField::InstallmentRate
            | FormField::ResidenceSince
            | FormField::ExistingCredits
            | FormField::PeopleLiable => FieldKind::Integer,
            _ => FieldKind::Choice,
        }
    }

    pub const fn is_numeric(self) -> bool {
        !matches!(self.kind(), FieldKind::Choice)
    }

    /// `(value, label)` pairs accepted by the scoring service for a choice field.
    pub const fn options(self) -> Option<&'static [(&'static str, &'static str)]> {
        match self {
            FormField::CheckingStatus => Some(CHECKING_STATUS_OPTIONS),
            FormField::CreditHistory => Some(CREDIT_HISTORY_OPTIONS),
            FormField::Employment => Some(EMPLOYMENT_OPTIONS),
            FormField::Savings => Some(SAVINGS_OPTIONS),
            FormField::Purpose => Some(PURPOSE_OPTIONS),
            FormField::PersonalStatus => Some(PERSONAL_STATUS_OPTIONS),
            FormField::OtherDebtors => Some(OTHER_DEBTORS_OPTIONS),
            FormField::Property => Some(PROPERTY_OPTIONS),
            FormField::OtherInstallment => Some(OTHER_INSTALLMENT_OPTIONS),
            FormField::Housing => Some(HOUSING_OPTIONS),
            FormField::Job => Some(JOB_OPTIONS),
            FormField::Telephone => Some(TELEPHONE_OPTIONS),
            FormField::ForeignWorker => Some(FOREIGN_WORKER_OPTIONS),
            _ => None,
        }
    }

    pub fn from_form_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|f| f.form_name() == name)
    }
}

impl fmt::Display for FormField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.form_name())
    }
}

// --- Vocabularies ---

pub const CHECKING_STATUS_OPTIONS: &[(&str, &str)] = &[
    ("less_than_0_dm", "Negative Balance"),
    ("0_to_200_dm", "0 - 200 DM"),
    ("more_than_200_dm", "> 200 DM"),
    ("no_account", "No Account"),
];

pub const CREDIT_HISTORY_OPTIONS: &[(&str, &str)] = &[
    ("no_credits_taken", "Clean History"),
    ("all_paid_back", "All Paid Back"),
    ("existing_paid_back", "Existing Paid Back"),
    ("delay_in_payment", "Past Delays"),
    ("critical_account", "Critical Account"),
];

pub const EMPLOYMENT_OPTIONS: &[(&str, &str)] = &[
    ("0", "Unemployed"),
    ("1", "< 1 year"),
    ("2", "1 - 4 years"),
    ("3", "4 - 7 years"),
    ("4", ">= 7 years"),
];

pub const SAVINGS_OPTIONS: &[(&str, &str)] = &[
    ("0", "< 100 DM"),
    ("1", "100 - 500 DM"),
    ("2", "500 - 1000 DM"),
    ("3", "> 1000 DM"),
    ("4", "Unknown / None"),
];

pub const PURPOSE_OPTIONS: &[(&str, &str)] = &[
    ("car_new", "New Car"),
    ("car_used", "Used Car"),
    ("furniture_equipment", "Furniture / Equipment"),
    ("radio_tv", "Radio / TV"),
    ("domestic_appliances", "Domestic Appliances"),
    ("repairs", "Repairs"),
    ("education", "Education"),
    ("retraining", "Retraining"),
    ("business", "Business"),
    ("other", "Other"),
];

pub const PERSONAL_STATUS_OPTIONS: &[(&str, &str)] = &[
    ("male_divorced_separated", "Male, Divorced / Separated"),
    ("female_divorced_separated_married", "Female, Divorced / Separated / Married"),
    ("male_single", "Male, Single"),
    ("male_married_widowed", "Male, Married / Widowed"),
    ("female_single", "Female, Single"),
];

pub const OTHER_DEBTORS_OPTIONS: &[(&str, &str)] = &[
    ("none", "None"),
    ("co_applicant", "Co-Applicant"),
    ("guarantor", "Guarantor"),
];

pub const PROPERTY_OPTIONS: &[(&str, &str)] = &[
    ("real_estate", "Real Estate"),
    ("building_society_savings", "Building Society Savings"),
    ("car_or_other", "Car or Other"),
    ("unknown_none", "Unknown / None"),
];

pub const OTHER_INSTALLMENT_OPTIONS: &[(&str, &str)] = &[
    ("bank", "Bank"),
    ("stores", "Stores"),
    ("none", "None"),
];

pub const HOUSING_OPTIONS: &[(&str, &str)] = &[
    ("rent", "Rent"),
    ("own", "Own"),
    ("for_free", "For Free"),
];

pub const JOB_OPTIONS: &[(&str, &str)] = &[
    ("unemployed_unskilled_non_resident", "Unemployed / Unskilled Non-Resident"),
    ("unskilled_resident", "Unskilled Resident"),
    ("skilled_employee", "Skilled Employee"),
    ("management_self_employed_highly_qualified", "Management / Self-Employed"),
];

pub const TELEPHONE_OPTIONS: &[(&str, &str)] = &[
    ("none", "None"),
    ("yes_registered", "Yes, Registered"),
];

pub const FOREIGN_WORKER_OPTIONS: &[(&str, &str)] = &[("yes", "Yes"), ("no", "No")];

// --- The record ---

/// Application form as entered: raw text for every field, never partial.
///
/// Nothing is validated here; the request transformer decides at submission
/// time whether the text coerces to what the scoring service expects.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormData {
    credit_amount: String,
    duration: String,
    age: String,
    checking_status: String,
    credit_history: String,
    employment: String,
    savings: String,
    purpose: String,
    installment_rate: String,
    personal_status: String,
    other_debtors: String,
    residence_since: String,
    property: String,
    other_installment: String,
    housing: String,
    existing_credits: String,
    job: String,
    people_liable: String,
    telephone: String,
    foreign_worker: String,
}

impl Default for FormData {
    fn default() -> Self {
        Self {
            credit_amount: "5000".into(),
            duration: "24".into(),
            age: "35".into(),
            checking_status: "no_account".into(),
            credit_history: "existing_paid_back".into(),
            employment: "1".into(),
            savings: "0".into(),
            purpose: "radio_tv".into(),
            installment_rate: "3".into(),
            personal_status: "male_single".into(),
            other_debtors: "none".into(),
            residence_since: "2".into(),
            property: "unknown_none".into(),
            other_installment: "none".into(),
            housing: "rent".into(),
            existing_credits: "1".into(),
            job: "skilled_employee".into(),
            people_liable: "1".into(),
            telephone: "none".into(),
            foreign_worker: "yes".into(),
        }
    }
}

impl FormData {
    pub fn get(&self, field: FormField) -> &str {
        match field {
            FormField::CreditAmount => &self.credit_amount,
            FormField::Duration => &self.duration,
            FormField::Age => &self.age,
            FormField::CheckingStatus => &self.checking_status,
            FormField::CreditHistory => &self.credit_history,
            FormField::Employment => &self.employment,
            FormField::Savings => &self.savings,
            FormField::Purpose => &self.purpose,
            FormField::InstallmentRate => &self.installment_rate,
            FormField::PersonalStatus => &self.personal_status,
            FormField::OtherDebtors => &self.other_debtors,
            FormField::ResidenceSince => &self.residence_since,
            FormField::Property => &self.property,
            FormField::OtherInstallment => &self.other_installment,
            FormField::Housing => &self.housing,
            FormField::ExistingCredits => &self.existing_credits,
            FormField::Job => &self.job,
            FormField::PeopleLiable => &self.people_liable,
            FormField::Telephone => &self.telephone,
            FormField::ForeignWorker => &self.foreign_worker,
        }
    }

    fn slot_mut(&mut self, field: FormField) -> &mut String {
        match field {
            FormField::CreditAmount => &mut self.credit_amount,
            FormField::Duration => &mut self.duration,
            FormField::Age => &mut self.age,
            FormField::CheckingStatus => &mut self.checking_status,
            FormField::CreditHistory => &mut self.credit_history,
            FormField::Employment => &mut self.employment,
            FormField::Savings => &mut self.savings,
            FormField::Purpose => &mut self.purpose,
            FormField::InstallmentRate => &mut self.installment_rate,
            FormField::PersonalStatus => &mut self.personal_status,
            FormField::OtherDebtors => &mut self.other_debtors,
            FormField::ResidenceSince => &mut self.residence_since,
            FormField::Property => &mut self.property,
            FormField::OtherInstallment => &mut self.other_installment,
            FormField::Housing => &mut self.housing,
            FormField::ExistingCredits => &mut self.existing_credits,
            FormField::Job => &mut self.job,
            FormField::PeopleLiable => &mut self.people_liable,
            FormField::Telephone => &mut self.telephone,
            FormField::ForeignWorker => &mut self.foreign_worker,
        }
    }

    /// Returns a copy with exactly one field replaced.
    #[must_use]
    pub fn update(&self, field: FormField, raw: impl Into<String>) -> Self {
        let mut next = self.clone();
        *next.slot_mut(field) = raw.into();
        next
    }

    pub fn iter(&self) -> impl Iterator<Item = (FormField, &str)> + '_ {
        FormField::ALL.into_iter().map(move |f| (f, self.get(f)))
    }
}
