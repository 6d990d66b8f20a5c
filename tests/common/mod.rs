use collegia::utils::password::hash_password;
#[allow(unused_imports)]
use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

#[allow(dead_code)]
pub struct TestDepartment {
    pub id: Uuid,
    pub name: String,
}

#[allow(dead_code)]
pub struct TestCourse {
    pub id: Uuid,
    pub department_id: Uuid,
}

#[allow(dead_code)]
pub struct TestAccount {
    pub id: Uuid,
    pub email: String,
    pub password: String,
}

pub async fn create_test_department(
    tx: &mut Transaction<'_, Postgres>,
    name: &str,
) -> TestDepartment {
    let id = sqlx::query_scalar::<_, Uuid>(
        "INSERT INTO departments (name, code, created_by_role, created_by_id)
         VALUES ($1, $2, 'admin', gen_random_uuid())
         RETURNING id",
    )
    .bind(name)
    .bind(format!("D-{}", &Uuid::new_v4().to_string()[..8]))
    .fetch_one(&mut **tx)
    .await
    .unwrap();

    TestDepartment {
        id,
        name: name.to_string(),
    }
}

pub async fn create_test_course(
    tx: &mut Transaction<'_, Postgres>,
    name: &str,
    department_id: Uuid,
) -> TestCourse {
    let id = sqlx::query_scalar::<_, Uuid>(
        "INSERT INTO courses (name, code, department_id, created_by_role, created_by_id)
         VALUES ($1, $2, $3, 'admin', gen_random_uuid())
         RETURNING id",
    )
    .bind(name)
    .bind(format!("C-{}", &Uuid::new_v4().to_string()[..8]))
    .bind(department_id)
    .fetch_one(&mut **tx)
    .await
    .unwrap();

    TestCourse { id, department_id }
}

pub async fn create_test_admin(
    tx: &mut Transaction<'_, Postgres>,
    email: &str,
    password: &str,
) -> TestAccount {
    let hashed = hash_password(password).unwrap();

    let id = sqlx::query_scalar::<_, Uuid>(
        "INSERT INTO admins (name, email, password, is_superuser)
         VALUES ('Test Admin', $1, $2, TRUE)
         RETURNING id",
    )
    .bind(email)
    .bind(&hashed)
    .fetch_one(&mut **tx)
    .await
    .unwrap();

    TestAccount {
        id,
        email: email.to_string(),
        password: password.to_string(),
    }
}

/// Create a teacher with the given role. Pass the department for an HOD,
/// both department and course for a tutor, neither for a principal.
pub async fn create_test_teacher(
    tx: &mut Transaction<'_, Postgres>,
    email: &str,
    password: &str,
    role: &str,
    department_id: Option<Uuid>,
    course_id: Option<Uuid>,
) -> TestAccount {
    let hashed = hash_password(password).unwrap();

    let id = sqlx::query_scalar::<_, Uuid>(
        "INSERT INTO teachers (name, email, phone_number, employee_id, role,
                               department_id, course_id, password)
         VALUES ('Test Teacher', $1, '5550000000', $2, $3, $4, $5, $6)
         RETURNING id",
    )
    .bind(email)
    .bind(format!("EMP-{}", &Uuid::new_v4().to_string()[..8]))
    .bind(role)
    .bind(department_id)
    .bind(course_id)
    .bind(&hashed)
    .fetch_one(&mut **tx)
    .await
    .unwrap();

    TestAccount {
        id,
        email: email.to_string(),
        password: password.to_string(),
    }
}

pub async fn create_test_student(
    tx: &mut Transaction<'_, Postgres>,
    email: &str,
    password: &str,
    department_id: Uuid,
    course_id: Uuid,
    approval_status: &str,
) -> TestAccount {
    let hashed = hash_password(password).unwrap();

    let id = sqlx::query_scalar::<_, Uuid>(
        "INSERT INTO students (name, email, phone_number, college_id,
                               department_id, course_id, password, approval_status)
         VALUES ('Test Student', $1, '5550000001', $2, $3, $4, $5, $6)
         RETURNING id",
    )
    .bind(email)
    .bind(format!("COL-{}", &Uuid::new_v4().to_string()[..8]))
    .bind(department_id)
    .bind(course_id)
    .bind(&hashed)
    .bind(approval_status)
    .fetch_one(&mut **tx)
    .await
    .unwrap();

    TestAccount {
        id,
        email: email.to_string(),
        password: password.to_string(),
    }
}

/// Create a form with a single required "Reason" text field.
#[allow(dead_code)]
pub async fn create_test_form(
    tx: &mut Transaction<'_, Postgres>,
    title: &str,
    department_id: Option<Uuid>,
) -> Uuid {
    let form_id = sqlx::query_scalar::<_, Uuid>(
        "INSERT INTO forms (title, description, department_id, created_by_role, created_by_id)
         VALUES ($1, '', $2, 'admin', gen_random_uuid())
         RETURNING id",
    )
    .bind(title)
    .bind(department_id)
    .fetch_one(&mut **tx)
    .await
    .unwrap();

    sqlx::query(
        "INSERT INTO form_fields (form_id, label, field_type, is_required, field_order)
         VALUES ($1, 'Reason', 'text', TRUE, 0)",
    )
    .bind(form_id)
    .execute(&mut **tx)
    .await
    .unwrap();

    form_id
}

pub fn generate_unique_email() -> String {
    format!("test-{}@test.com", Uuid::new_v4())
}
