mod azure_whisper_engine_test;
