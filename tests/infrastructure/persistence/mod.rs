mod pg_import_job_repository_test;
mod pg_talk_repository_test;
