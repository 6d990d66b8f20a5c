use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::modules::admins::model::{
    Admin, AdminCreatedResponse, AdminsResponse, CreateAdminDto, UpdateAdminDto,
};
use crate::modules::auth::model::{
    LoginRequest, LoginResponse, MessageResponse, PrincipalKind, Role,
};
use crate::modules::courses::model::{
    CourseCreatedResponse, CoursesResponse, CreateCourseDto, UpdateCourseDto,
};
use crate::modules::departments::model::{
    CreateDepartmentDto, DepartmentCreatedResponse, DepartmentsResponse, UpdateDepartmentDto,
};
use crate::modules::forms::model::{
    CreateFormDto, CreateFormFieldDto, Form, FormCreatedResponse, FormField, FormWithFields,
    FormsResponse, UpdateFormDto,
};
use crate::modules::students::model::{
    RegisterStudentDto, ReviewStudentDto, StudentRegisteredResponse, StudentWithNames,
    StudentsResponse,
};
use crate::modules::submissions::model::{
    FormSubmission, ReviewResponse, ReviewSubmissionDto, SubmissionCreatedResponse,
    SubmissionStage, SubmissionView, SubmissionsResponse, SubmitFormDto,
};
use crate::modules::teachers::model::{
    CreateTeacherDto, TeacherCreatedResponse, TeacherWithNames, TeachersResponse, UpdateTeacherDto,
};

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::modules::auth::controller::login,
        crate::modules::admins::controller::register_admin,
        crate::modules::admins::controller::create_admin,
        crate::modules::admins::controller::list_admins,
        crate::modules::admins::controller::update_admin,
        crate::modules::admins::controller::deactivate_admin,
        crate::modules::teachers::controller::create_teacher,
        crate::modules::teachers::controller::list_teachers,
        crate::modules::teachers::controller::get_profile,
        crate::modules::teachers::controller::get_teacher,
        crate::modules::teachers::controller::update_teacher,
        crate::modules::teachers::controller::deactivate_teacher,
        crate::modules::students::controller::register_student,
        crate::modules::students::controller::get_student_profile,
        crate::modules::students::controller::list_pending,
        crate::modules::students::controller::list_approved,
        crate::modules::students::controller::review_student,
        crate::modules::departments::controller::list_departments,
        crate::modules::departments::controller::create_department,
        crate::modules::departments::controller::update_department,
        crate::modules::courses::controller::list_courses,
        crate::modules::courses::controller::create_course,
        crate::modules::courses::controller::update_course,
        crate::modules::forms::controller::list_forms,
        crate::modules::forms::controller::get_form,
        crate::modules::forms::controller::create_form,
        crate::modules::forms::controller::update_form,
        crate::modules::forms::controller::delete_form,
        crate::modules::submissions::controller::submit_form,
        crate::modules::submissions::controller::list_my_submissions,
        crate::modules::submissions::controller::list_submissions,
        crate::modules::submissions::controller::get_submission,
        crate::modules::submissions::controller::review_submission,
    ),
    components(
        schemas(
            LoginRequest,
            LoginResponse,
            MessageResponse,
            PrincipalKind,
            Role,
            Admin,
            CreateAdminDto,
            UpdateAdminDto,
            AdminsResponse,
            AdminCreatedResponse,
            CreateTeacherDto,
            UpdateTeacherDto,
            TeacherWithNames,
            TeachersResponse,
            TeacherCreatedResponse,
            RegisterStudentDto,
            ReviewStudentDto,
            StudentWithNames,
            StudentsResponse,
            StudentRegisteredResponse,
            CreateDepartmentDto,
            UpdateDepartmentDto,
            DepartmentsResponse,
            DepartmentCreatedResponse,
            CreateCourseDto,
            UpdateCourseDto,
            CoursesResponse,
            CourseCreatedResponse,
            Form,
            FormField,
            FormWithFields,
            CreateFormDto,
            CreateFormFieldDto,
            UpdateFormDto,
            FormsResponse,
            FormCreatedResponse,
            FormSubmission,
            SubmissionStage,
            SubmissionView,
            SubmitFormDto,
            ReviewSubmissionDto,
            SubmissionsResponse,
            SubmissionCreatedResponse,
            ReviewResponse,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Auth", description = "Unified login for all principal kinds"),
        (name = "Admins", description = "Admin account management"),
        (name = "Teachers", description = "Teacher management (principal, HOD, tutor)"),
        (name = "Students", description = "Student registration and approval"),
        (name = "Departments", description = "Department management"),
        (name = "Courses", description = "Course management"),
        (name = "Forms", description = "Custom form schemas"),
        (name = "Submissions", description = "Form submissions and the three-tier approval workflow")
    ),
    info(
        title = "Collegia API",
        version = "0.1.0",
        description = "Student records backend with a three-tier form approval workflow (tutor, HOD, principal), built with Axum and PostgreSQL.",
        license(
            name = "MIT"
        )
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            )
        }
    }
}
