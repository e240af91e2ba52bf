// Form schemas for registration and article editing

use super::{FieldKind, FieldSpec, FormSchema, Rule};

pub static REGISTER_FORM: FormSchema = FormSchema {
    fields: &[
        FieldSpec {
            name: "name",
            label: "Name",
            kind: FieldKind::Text,
            rules: &[Rule::Length {
                min: 1,
                max: Some(50),
            }],
        },
        FieldSpec {
            name: "username",
            label: "Username",
            kind: FieldKind::Text,
            rules: &[Rule::Length {
                min: 4,
                max: Some(25),
            }],
        },
        FieldSpec {
            name: "email",
            label: "Email",
            kind: FieldKind::Email,
            rules: &[Rule::Length {
                min: 6,
                max: Some(50),
            }],
        },
        FieldSpec {
            name: "password",
            label: "Password",
            kind: FieldKind::Password,
            rules: &[
                Rule::Required,
                Rule::EqualTo {
                    other: "confirm",
                    message: "Passwords do not match",
                },
            ],
        },
        FieldSpec {
            name: "confirm",
            label: "Confirm Password",
            kind: FieldKind::Password,
            rules: &[],
        },
    ],
};

pub static ARTICLE_FORM: FormSchema = FormSchema {
    fields: &[
        FieldSpec {
            name: "title",
            label: "Title",
            kind: FieldKind::Text,
            rules: &[Rule::Length {
                min: 1,
                max: Some(200),
            }],
        },
        FieldSpec {
            name: "body",
            label: "Body",
            kind: FieldKind::TextArea,
            rules: &[Rule::Length { min: 30, max: None }],
        },
    ],
};
